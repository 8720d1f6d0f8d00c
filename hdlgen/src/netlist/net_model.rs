use crate::error::{GenerationError, Result};
use crate::graph::{WireBit, WireId};

use std::collections::HashMap;

/// Location of one bit inside a [`Net`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionPoint {
    pub net: usize,
    pub bit: u32,
}

/// One bit of one component end, as seen from the net it lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub component: usize,
    pub end: usize,
    pub bit: u32,
    pub net_bit: u32,
}

/// A group of wires that touch, carrying `width` bits.
#[derive(Clone, Debug)]
pub struct Net {
    id: usize,
    width: u32,
    is_root: bool,
    first_wire: usize,
    sources: Vec<Endpoint>,
    sinks: Vec<Endpoint>,
}

impl Net {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Root nets are declared as signals; every other net is an alias of bits of root nets.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn sources(&self) -> &[Endpoint] {
        &self.sources
    }

    pub fn sinks(&self) -> &[Endpoint] {
        &self.sinks
    }

    pub fn name(&self) -> String {
        if self.width == 1 {
            format!("s_LOGISIM_NET_{}", self.id)
        } else {
            format!("s_LOGISIM_BUS_{}", self.id)
        }
    }
}

/// A contiguous copy from the canonical bits of one net into the aliased bits of another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WiringRun {
    pub target: ConnectionPoint,
    pub source: ConnectionPoint,
    pub width: u32,
}

struct UnionFind {
    parents: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> UnionFind {
        UnionFind {
            parents: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parents[x] != x {
            self.parents[x] = self.parents[self.parents[x]];
            x = self.parents[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let a = self.find(a);
        let b = self.find(b);
        if a != b {
            // Lower index wins, so roots don't depend on merge order
            let (root, child) = if a < b { (a, b) } else { (b, a) };
            self.parents[child] = root;
        }
    }
}

/// Collects joins and splices of one circuit, then freezes them into a [`NetModel`].
pub struct NetModelBuilder {
    scope: String,
    widths: Vec<u32>,
    offsets: Vec<usize>,
    wires: UnionFind,
    bits: UnionFind,
}

impl NetModelBuilder {
    /// `widths` holds the width of every wire of the circuit `scope`, indexed by wire position.
    pub fn new(scope: impl Into<String>, widths: Vec<u32>) -> NetModelBuilder {
        let mut offsets = Vec::with_capacity(widths.len());
        let mut total = 0;
        for width in widths.iter() {
            offsets.push(total);
            total += *width as usize;
        }
        NetModelBuilder {
            scope: scope.into(),
            wires: UnionFind::new(widths.len()),
            bits: UnionFind::new(total),
            widths,
            offsets,
        }
    }

    /// Puts `a` and `b` into the same net, bit for bit.
    pub fn join(&mut self, a: WireId, b: WireId) -> Result<()> {
        let width_a = self.width_of(a)?;
        let width_b = self.width_of(b)?;
        if width_a != width_b {
            return Err(GenerationError::WidthMismatch {
                circuit: self.scope.clone(),
                what: format!("wires {} and {} are joined", a.index(), b.index()),
                expected: width_a,
                found: width_b,
            });
        }
        self.wires.union(a.index(), b.index());
        for bit in 0..width_a {
            self.merge(a.bit(bit), b.bit(bit))?;
        }
        Ok(())
    }

    /// Puts two single bits into the same bit class without merging their nets.
    pub fn merge(&mut self, a: WireBit, b: WireBit) -> Result<()> {
        let a = self.flat(a)?;
        let b = self.flat(b)?;
        self.bits.union(a, b);
        Ok(())
    }

    pub fn build(mut self) -> NetModel {
        let num_wires = self.widths.len();

        let mut net_ids = HashMap::new();
        let mut wire_nets = Vec::with_capacity(num_wires);
        let mut nets = Vec::new();
        for wire in 0..num_wires {
            let root = self.wires.find(wire);
            let id = *net_ids.entry(root).or_insert_with(|| {
                nets.push(Net {
                    id: nets.len(),
                    width: self.widths[wire],
                    is_root: false,
                    first_wire: wire,
                    sources: Vec::new(),
                    sinks: Vec::new(),
                });
                nets.len() - 1
            });
            wire_nets.push(id);
        }

        // Canonical location of a bit class: widest net, then lowest net id, then lowest bit
        let mut best: HashMap<usize, ConnectionPoint> = HashMap::new();
        for wire in 0..num_wires {
            let net = wire_nets[wire];
            for bit in 0..self.widths[wire] {
                let class = self.bits.find(self.offsets[wire] + bit as usize);
                let candidate = ConnectionPoint { net, bit };
                best.entry(class)
                    .and_modify(|current| {
                        let key = |p: &ConnectionPoint| (u32::MAX - nets[p.net].width, p.net, p.bit);
                        if key(&candidate) < key(current) {
                            *current = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
        }

        let mut canonical = Vec::with_capacity(self.bits.parents.len());
        for wire in 0..num_wires {
            for bit in 0..self.widths[wire] {
                let class = self.bits.find(self.offsets[wire] + bit as usize);
                canonical.push(best[&class]);
            }
        }
        for point in best.values() {
            nets[point.net].is_root = true;
        }

        NetModel {
            scope: self.scope,
            nets,
            wire_nets,
            offsets: self.offsets,
            canonical,
        }
    }

    fn width_of(&self, wire: WireId) -> Result<u32> {
        self.widths.get(wire.index()).copied().ok_or_else(|| {
            GenerationError::internal(format!(
                "Wire {} is not part of circuit \"{}\".",
                wire.index(),
                self.scope
            ))
        })
    }

    fn flat(&self, bit: WireBit) -> Result<usize> {
        let width = self.width_of(bit.wire)?;
        if bit.bit >= width {
            return Err(GenerationError::internal(format!(
                "Bit {} of wire {} is out of range in circuit \"{}\".",
                bit.bit,
                bit.wire.index(),
                self.scope
            )));
        }
        Ok(self.offsets[bit.wire.index()] + bit.bit as usize)
    }
}

/// The frozen net structure of one circuit.
///
/// Every wire belongs to exactly one [`Net`]. Bits that were spliced together form a bit class,
/// and every bit class has one canonical [`ConnectionPoint`] which all connections resolve to.
pub struct NetModel {
    scope: String,
    nets: Vec<Net>,
    wire_nets: Vec<usize>,
    offsets: Vec<usize>,
    canonical: Vec<ConnectionPoint>,
}

impl NetModel {
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn net(&self, id: usize) -> &Net {
        &self.nets[id]
    }

    pub fn root_nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.iter().filter(|net| net.is_root)
    }

    /// The point every connection to `bit` is resolved to, or `None` if `bit` is not a bit of
    /// a wire of this circuit.
    pub fn canonical(&self, bit: WireBit) -> Option<ConnectionPoint> {
        let net = self.net_of_wire(bit.wire)?;
        if bit.bit >= net.width {
            return None;
        }
        let offset = self.offsets.get(bit.wire.index())?;
        self.canonical.get(offset + bit.bit as usize).copied()
    }

    /// The net holding the canonical location of `bit`.
    pub fn net_of(&self, bit: WireBit) -> Option<&Net> {
        self.canonical(bit).map(|point| &self.nets[point.net])
    }

    /// The net `wire` itself belongs to, regardless of splices.
    pub fn net_of_wire(&self, wire: WireId) -> Option<&Net> {
        let net = self.wire_nets.get(wire.index())?;
        self.nets.get(*net)
    }

    /// Returns `true` if the points map onto a single net at a constant base offset, with no
    /// gaps, reordering or splits.
    pub fn is_continuous_bus(&self, points: &[Option<ConnectionPoint>]) -> bool {
        continuous_base(points).is_some()
    }

    /// Copies that keep every bit of every root net driven: each non-canonical bit of a root
    /// net is assigned from its canonical location. Adjacent bits are merged into one run.
    pub fn wiring(&self) -> Vec<WiringRun> {
        let mut runs: Vec<WiringRun> = Vec::new();
        for net in self.root_nets() {
            for bit in 0..net.width {
                let here = ConnectionPoint { net: net.id, bit };
                let source = self.canonical_of_point(here);
                if source == here {
                    continue;
                }
                if let Some(run) = runs.last_mut() {
                    if run.target.net == here.net
                        && run.target.bit + run.width == here.bit
                        && run.source.net == source.net
                        && run.source.bit + run.width == source.bit
                    {
                        run.width += 1;
                        continue;
                    }
                }
                runs.push(WiringRun {
                    target: here,
                    source,
                    width: 1,
                });
            }
        }
        runs
    }

    pub fn add_source(&mut self, point: ConnectionPoint, component: usize, end: usize, bit: u32) {
        self.nets[point.net].sources.push(Endpoint {
            component,
            end,
            bit,
            net_bit: point.bit,
        });
    }

    pub fn add_sink(&mut self, point: ConnectionPoint, component: usize, end: usize, bit: u32) {
        self.nets[point.net].sinks.push(Endpoint {
            component,
            end,
            bit,
            net_bit: point.bit,
        });
    }

    /// Everything driving `point`.
    pub fn drivers(&self, point: ConnectionPoint) -> impl Iterator<Item = &Endpoint> {
        self.nets[point.net]
            .sources
            .iter()
            .filter(move |source| source.net_bit == point.bit)
    }

    /// Points with more than one driver, with their driver count.
    pub fn multiply_driven(&self) -> Vec<(ConnectionPoint, usize)> {
        let mut ret = Vec::new();
        for net in self.nets.iter() {
            let mut counts = vec![0usize; net.width as usize];
            for source in net.sources.iter() {
                counts[source.net_bit as usize] += 1;
            }
            for (bit, count) in counts.into_iter().enumerate() {
                if count > 1 {
                    ret.push((
                        ConnectionPoint {
                            net: net.id,
                            bit: bit as u32,
                        },
                        count,
                    ));
                }
            }
        }
        ret
    }

    /// Nets that are read on some bit nothing drives, with those bits in ascending order.
    pub fn undriven(&self) -> Vec<(usize, Vec<u32>)> {
        let mut ret = Vec::new();
        for net in self.nets.iter() {
            let mut bits = net
                .sinks
                .iter()
                .map(|sink| sink.net_bit)
                .filter(|bit| !net.sources.iter().any(|source| source.net_bit == *bit))
                .collect::<Vec<_>>();
            bits.sort_unstable();
            bits.dedup();
            if !bits.is_empty() {
                ret.push((net.id, bits));
            }
        }
        ret
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn canonical_of_point(&self, point: ConnectionPoint) -> ConnectionPoint {
        // Any wire of the net carries the same bit classes
        let wire = self.nets[point.net].first_wire;
        self.canonical[self.offsets[wire] + point.bit as usize]
    }
}

/// `(net, base)` if bit `i` of `points` is bit `base + i` of one net for every `i`.
pub fn continuous_base(points: &[Option<ConnectionPoint>]) -> Option<(usize, u32)> {
    let first = (*points.first()?)?;
    for (i, point) in points.iter().enumerate() {
        let point = (*point)?;
        if point.net != first.net || point.bit != first.bit + i as u32 {
            return None;
        }
    }
    Some((first.net, first.bit))
}
