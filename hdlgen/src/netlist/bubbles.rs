use crate::error::{GenerationError, Result};
use crate::graph::Direction;

/// The three flat boundary busses that carry pins nothing inside the circuit is connected to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BubbleKind {
    Input,
    Output,
    Inout,
}

impl BubbleKind {
    pub const ALL: [BubbleKind; 3] = [BubbleKind::Input, BubbleKind::Output, BubbleKind::Inout];

    pub fn port_name(self) -> &'static str {
        match self {
            BubbleKind::Input => "LOGISIM_INPUT_BUBBLES",
            BubbleKind::Output => "LOGISIM_OUTPUT_BUBBLES",
            BubbleKind::Inout => "LOGISIM_INOUT_BUBBLES",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            BubbleKind::Input => Direction::Input,
            BubbleKind::Output => Direction::Output,
            BubbleKind::Inout => Direction::Inout,
        }
    }

    pub fn of(direction: Direction) -> BubbleKind {
        match direction {
            Direction::Input => BubbleKind::Input,
            Direction::Output => BubbleKind::Output,
            Direction::Inout => BubbleKind::Inout,
        }
    }
}

/// Inclusive index range on a bubble bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BubbleRange {
    pub start: u32,
    pub end: u32,
}

impl BubbleRange {
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Per-kind ranges reserved by one component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BubbleRanges {
    pub input: Option<BubbleRange>,
    pub output: Option<BubbleRange>,
    pub inout: Option<BubbleRange>,
}

impl BubbleRanges {
    pub fn get(&self, kind: BubbleKind) -> Option<BubbleRange> {
        match kind {
            BubbleKind::Input => self.input,
            BubbleKind::Output => self.output,
            BubbleKind::Inout => self.inout,
        }
    }

    fn slot(&mut self, kind: BubbleKind) -> &mut Option<BubbleRange> {
        match kind {
            BubbleKind::Input => &mut self.input,
            BubbleKind::Output => &mut self.output,
            BubbleKind::Inout => &mut self.inout,
        }
    }
}

/// Total bubble counts of a circuit, its own pins plus everything below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BubbleCounts {
    pub input: u32,
    pub output: u32,
    pub inout: u32,
}

impl BubbleCounts {
    pub fn get(&self, kind: BubbleKind) -> u32 {
        match kind {
            BubbleKind::Input => self.input,
            BubbleKind::Output => self.output,
            BubbleKind::Inout => self.inout,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input == 0 && self.output == 0 && self.inout == 0
    }
}

/// Hands out contiguous ranges on the three bubble busses of one circuit.
///
/// Ranges are handed out in request order. Once [`seal`](BubbleAllocator::seal)ed, the totals
/// are final and any further request is an internal error.
pub struct BubbleAllocator {
    scope: String,
    counts: BubbleCounts,
    sealed: bool,
}

impl BubbleAllocator {
    pub fn new(scope: impl Into<String>) -> BubbleAllocator {
        BubbleAllocator {
            scope: scope.into(),
            counts: BubbleCounts::default(),
            sealed: false,
        }
    }

    /// Reserves `count` indices of `kind`. Reserving nothing yields no range.
    pub fn allocate(&mut self, kind: BubbleKind, count: u32) -> Result<Option<BubbleRange>> {
        if self.sealed {
            return Err(GenerationError::internal(format!(
                "Bubble range requested for \"{}\" after its allocation was sealed.",
                self.scope
            )));
        }
        if count == 0 {
            return Ok(None);
        }
        let total = match kind {
            BubbleKind::Input => &mut self.counts.input,
            BubbleKind::Output => &mut self.counts.output,
            BubbleKind::Inout => &mut self.counts.inout,
        };
        let start = *total;
        *total += count;
        Ok(Some(BubbleRange {
            start,
            end: start + count - 1,
        }))
    }

    /// Reserves one range per kind, sized by a child's totals.
    pub fn allocate_all(&mut self, counts: BubbleCounts) -> Result<BubbleRanges> {
        let mut ranges = BubbleRanges::default();
        for kind in BubbleKind::ALL.iter() {
            *ranges.slot(*kind) = self.allocate(*kind, counts.get(*kind))?;
        }
        Ok(ranges)
    }

    pub fn seal(&mut self) -> BubbleCounts {
        self.sealed = true;
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_contiguous_per_kind() {
        let mut allocator = BubbleAllocator::new("m");

        assert_eq!(
            allocator.allocate(BubbleKind::Input, 2).unwrap(),
            Some(BubbleRange { start: 0, end: 1 })
        );
        assert_eq!(
            allocator.allocate(BubbleKind::Output, 1).unwrap(),
            Some(BubbleRange { start: 0, end: 0 })
        );
        assert_eq!(allocator.allocate(BubbleKind::Input, 0).unwrap(), None);
        assert_eq!(
            allocator.allocate(BubbleKind::Input, 3).unwrap(),
            Some(BubbleRange { start: 2, end: 4 })
        );

        let counts = allocator.seal();
        assert_eq!(counts.input, 5);
        assert_eq!(counts.output, 1);
        assert_eq!(counts.inout, 0);
    }

    #[test]
    fn child_totals_become_one_range_each() {
        let mut allocator = BubbleAllocator::new("m");
        allocator.allocate(BubbleKind::Inout, 1).unwrap();

        let ranges = allocator
            .allocate_all(BubbleCounts {
                input: 0,
                output: 2,
                inout: 4,
            })
            .unwrap();

        assert_eq!(ranges.input, None);
        assert_eq!(ranges.output, Some(BubbleRange { start: 0, end: 1 }));
        assert_eq!(ranges.inout.map(|range| range.len()), Some(4));
        assert_eq!(ranges.inout.map(|range| range.start), Some(1));
    }

    #[test]
    fn allocation_after_seal_is_internal_error() {
        let mut allocator = BubbleAllocator::new("m");
        allocator.seal();

        match allocator.allocate(BubbleKind::Input, 1) {
            Err(GenerationError::Internal(message)) => assert_eq!(
                message,
                "Bubble range requested for \"m\" after its allocation was sealed."
            ),
            _ => panic!("expected an internal error"),
        }
    }
}
