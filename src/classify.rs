use serde::Serialize;

/// Semantic category of a raw type identifier; drives which control gets synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Boolean,
    Color,
    File,
    Float,
    Image,
    Integer,
    Text,
    Ignored,
    Unsupported,
}

impl TypeCategory {
    /// Categories backed by a lookup table, in lookup priority order.
    pub const TABLE_ORDER: [Self; 7] = [
        Self::Boolean,
        Self::Color,
        Self::File,
        Self::Float,
        Self::Image,
        Self::Integer,
        Self::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::File => "file",
            Self::Float => "float",
            Self::Image => "image",
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Ignored => "ignored",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn table(self) -> &'static [TypePattern] {
        match self {
            Self::Boolean => BOOL_TYPES,
            Self::Color => COLOR_TYPES,
            Self::File => FILE_TYPES,
            Self::Float => FLOAT_TYPES,
            Self::Image => IMAGE_TYPES,
            Self::Integer => INTEGER_TYPES,
            Self::Text => TEXT_TYPES,
            Self::Ignored => IGNORE_TYPES,
            Self::Unsupported => &[],
        }
    }
}

/// One entry of a classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePattern {
    Exact(&'static str),
    /// A family of types sharing a package prefix and a name suffix.
    Family {
        prefix: &'static str,
        suffix: &'static str,
    },
}

impl TypePattern {
    pub fn matches(self, raw_type: &str) -> bool {
        match self {
            Self::Exact(name) => raw_type == name,
            Self::Family { prefix, suffix } => {
                raw_type.len() >= prefix.len() + suffix.len()
                    && raw_type.starts_with(prefix)
                    && raw_type.ends_with(suffix)
            }
        }
    }
}

pub const CONTEXT_TYPE: &str = "org.scijava.Context";

const BOOL_TYPES: &[TypePattern] = &[
    TypePattern::Exact("boolean"),
    TypePattern::Exact("java.lang.Boolean"),
];

const COLOR_TYPES: &[TypePattern] = &[TypePattern::Exact("org.scijava.util.ColorRGB")];

const FILE_TYPES: &[TypePattern] = &[TypePattern::Exact("java.io.File")];

const FLOAT_TYPES: &[TypePattern] = &[
    TypePattern::Exact("double"),
    TypePattern::Exact("float"),
    TypePattern::Exact("java.lang.Double"),
    TypePattern::Exact("java.lang.Float"),
    TypePattern::Exact("java.math.BigDecimal"),
];

// Trigger-only widgets carry no data value.
const IGNORE_TYPES: &[TypePattern] = &[TypePattern::Exact("org.scijava.widget.Button")];

const IMAGE_TYPES: &[TypePattern] = &[
    TypePattern::Exact("net.imagej.Dataset"),
    TypePattern::Exact("net.imagej.display.DataView"),
    TypePattern::Exact("net.imagej.display.DatasetView"),
    TypePattern::Exact("net.imagej.display.ImageDisplay"),
    TypePattern::Exact("net.imglib2.IterableInterval"),
    TypePattern::Exact("net.imglib2.RandomAccessibleInterval"),
    TypePattern::Family {
        prefix: "net.imglib2.img.",
        suffix: "Img",
    },
];

const INTEGER_TYPES: &[TypePattern] = &[
    TypePattern::Exact("byte"),
    TypePattern::Exact("int"),
    TypePattern::Exact("long"),
    TypePattern::Exact("short"),
    TypePattern::Exact("java.lang.Byte"),
    TypePattern::Exact("java.lang.Integer"),
    TypePattern::Exact("java.lang.Long"),
    TypePattern::Exact("java.lang.Short"),
    TypePattern::Exact("java.math.BigInteger"),
];

const TEXT_TYPES: &[TypePattern] = &[
    TypePattern::Exact("char"),
    TypePattern::Exact("java.lang.Character"),
    TypePattern::Exact("java.lang.String"),
    TypePattern::Exact("java.util.Date"),
];

fn in_table(table: &[TypePattern], raw_type: &str) -> bool {
    table.iter().any(|pattern| pattern.matches(raw_type))
}

/// Table lookup over the seven value categories; the first table containing
/// `raw_type` wins, anything else is `Unsupported`.
pub fn classify(raw_type: &str) -> TypeCategory {
    TypeCategory::TABLE_ORDER
        .into_iter()
        .find(|category| in_table(category.table(), raw_type))
        .unwrap_or(TypeCategory::Unsupported)
}

pub fn is_ignored(raw_type: &str) -> bool {
    in_table(IGNORE_TYPES, raw_type)
}

/// Service and context handles are injected by the remote runtime, never by the user.
pub fn is_infrastructure_type(raw_type: &str) -> bool {
    raw_type.ends_with("Service") || raw_type == CONTEXT_TYPE
}
