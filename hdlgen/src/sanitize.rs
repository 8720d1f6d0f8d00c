//! Turning user-supplied labels into identifiers that are valid in both target dialects.
//!
//! Every label that ends up in emitted text (pin names, instance labels, entity names) goes
//! through [`sanitize`]. A label that is already a valid identifier is returned as-is (apart from
//! surrounding whitespace); any other label is rewritten and gets `_<suffix>` appended, so two
//! labels that rewrite to the same text can be told apart by their suffixes.

/// Reserved words of either dialect. Compared case-insensitively.
const RESERVED_WORDS: &[&str] = &[
    // VHDL
    "abs", "access", "after", "alias", "all", "and", "architecture", "array", "assert",
    "attribute", "begin", "block", "body", "buffer", "bus", "case", "component", "configuration",
    "constant", "disconnect", "downto", "else", "elsif", "end", "entity", "exit", "file", "for",
    "function", "generate", "generic", "group", "guarded", "if", "impure", "in", "inertial",
    "inout", "is", "label", "library", "linkage", "literal", "loop", "map", "mod", "nand", "new",
    "next", "nor", "not", "null", "of", "on", "open", "or", "others", "out", "package", "port",
    "postponed", "procedure", "process", "pure", "range", "record", "register", "reject", "rem",
    "report", "return", "rol", "ror", "select", "severity", "signal", "shared", "sla", "sll",
    "sra", "srl", "subtype", "then", "to", "transport", "type", "unaffected", "units", "until",
    "use", "variable", "wait", "when", "while", "with", "xnor", "xor",
    // Verilog
    "always", "assign", "automatic", "buf", "bufif0", "bufif1", "casex", "casez", "cell",
    "cmos", "config", "deassign", "default", "defparam", "design", "disable", "edge",
    "endcase", "endconfig", "endfunction", "endgenerate", "endmodule", "endprimitive",
    "endspecify", "endtable", "endtask", "event", "force", "forever", "fork", "genvar",
    "highz0", "highz1", "ifnone", "incdir", "include", "initial", "input", "instance", "integer",
    "join", "large", "liblist", "localparam", "macromodule", "medium", "module", "negedge",
    "nmos", "noshowcancelled", "notif0", "notif1", "output", "parameter", "pmos", "posedge",
    "primitive", "pull0", "pull1", "pulldown", "pullup", "pulsestyle_onevent",
    "pulsestyle_ondetect", "rcmos", "real", "realtime", "reg", "release", "repeat", "rnmos",
    "rpmos", "rtran", "rtranif0", "rtranif1", "scalared", "showcancelled", "signed", "small",
    "specify", "specparam", "strong0", "strong1", "supply0", "supply1", "table", "task", "time",
    "tran", "tranif0", "tranif1", "tri", "tri0", "tri1", "triand", "trior", "trireg", "unsigned",
    "vectored", "wand", "weak0", "weak1", "wire", "wor",
];

pub fn is_reserved_word(label: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(label))
}

/// Returns `true` if `label` cannot be used verbatim as an identifier in the emitted HDL.
pub fn is_invalid_identifier(label: &str) -> bool {
    let mut chars = label.chars();
    let starts_with_letter = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(is_word_char) {
        return true;
    }
    label.ends_with('_') || label.contains("__") || is_reserved_word(label)
}

/// Rewrites `raw_label` into a valid identifier.
///
/// Leading and trailing whitespace is dropped. `!` and `~` (and any whitespace after them) become
/// `NOT_`, a label that doesn't start with a letter gets an `L_` prefix, other non-word
/// characters become `_`, and runs of `_` collapse to one with no `_` left at the end. If the
/// result differs from the trimmed input, or collides with a reserved word, `_` followed by the
/// cleaned `suffix` is appended.
///
/// Sanitizing an already-sanitized label with the same suffix returns it unchanged.
pub fn sanitize(raw_label: &str, suffix: &str) -> String {
    let trimmed = raw_label.trim();

    let mut label = String::with_capacity(trimmed.len() + 4);
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '!' || c == '~' {
            label.push_str("NOT_");
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
        } else {
            label.push(c);
        }
    }

    if !label.starts_with(|c: char| c.is_ascii_alphabetic()) {
        label.insert_str(0, "L_");
    }

    let mut label = squeeze_underscores(&label);
    while label.ends_with('_') {
        label.pop();
    }

    let altered = label != trimmed;
    if altered || is_reserved_word(&label) {
        let suffix = clean_suffix(suffix);
        if suffix.is_empty() {
            if !altered {
                label.insert_str(0, "L_");
            }
        } else {
            label.push('_');
            label.push_str(&suffix);
        }
    }

    label
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replaces non-word characters with `_` and collapses `_` runs.
fn squeeze_underscores(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    for c in s.chars() {
        let c = if is_word_char(c) { c } else { '_' };
        if c == '_' && ret.ends_with('_') {
            continue;
        }
        ret.push(c);
    }
    ret
}

fn clean_suffix(suffix: &str) -> String {
    squeeze_underscores(suffix.trim())
        .trim_matches('_')
        .to_string()
}
