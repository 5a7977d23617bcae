//! Classification of field types by their syntax.
//!
//! The runtime supports a closed set of leaf types. Anything else that looks
//! like a standard library type is rejected, and remaining named types are
//! assumed to be nested schemas.

use syn::{GenericArgument, PathArguments, Type, TypePath};

/// How a field participates in the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldKind {
    /// A supported leaf value.
    Leaf,
    /// A struct implementing `Schema`.
    Nested,
    /// A type that cannot be bound.
    Unsupported,
}

const SCALARS: &[&str] = &["bool", "i64", "u64", "String", "Duration", "TimeValue"];
const LIST_ELEMENTS: &[&str] = &["bool", "i64", "u64", "u8", "String", "Duration"];
const MAP_VALUES: &[&str] = &["i64", "String"];
const MAPS: &[&str] = &["HashMap", "BTreeMap"];

/// Primitive, pointer-like and container types that are never schemas.
const REJECTED: &[&str] = &[
    "i8", "i16", "i32", "i128", "isize", "u8", "u16", "u32", "u128", "usize", "f32", "f64",
    "char", "str", "Option", "Box", "Rc", "Arc", "Weak", "Cell", "RefCell", "Mutex", "RwLock",
    "Cow", "Vec", "VecDeque", "LinkedList", "HashMap", "BTreeMap", "HashSet", "BTreeSet",
    "BinaryHeap", "PathBuf", "SystemTime", "Instant", "Sender", "Receiver", "SyncSender",
    "PhantomData",
];

/// Classifies a field type.
pub(crate) fn classify(ty: &Type) -> FieldKind {
    match ty {
        Type::Paren(inner) => classify(&inner.elem),
        Type::Group(inner) => classify(&inner.elem),
        Type::Path(path) if path.qself.is_none() => classify_path(path),
        _ => FieldKind::Unsupported,
    }
}

fn classify_path(path: &TypePath) -> FieldKind {
    let Some(last) = path.path.segments.last() else {
        return FieldKind::Unsupported;
    };
    let name = last.ident.to_string();
    let args = type_arguments(&last.arguments);

    let leaf = match (name.as_str(), args.as_slice()) {
        (scalar, []) => SCALARS.contains(&scalar),
        ("Vec", [element]) => plain_name(element).is_some_and(|e| LIST_ELEMENTS.contains(&e.as_str())),
        (map, [key, value, ..]) if MAPS.contains(&map) => {
            plain_name(key).is_some_and(|k| k == "String")
                && plain_name(value).is_some_and(|v| MAP_VALUES.contains(&v.as_str()))
        }
        _ => false,
    };
    if leaf {
        FieldKind::Leaf
    } else if REJECTED.contains(&name.as_str()) {
        FieldKind::Unsupported
    } else {
        FieldKind::Nested
    }
}

fn type_arguments(args: &PathArguments) -> Vec<&Type> {
    let PathArguments::AngleBracketed(angle) = args else {
        return Vec::new();
    };
    angle
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        })
        .collect()
}

/// The final path segment of a type without generic arguments.
fn plain_name(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    last.arguments
        .is_none()
        .then(|| last.ident.to_string())
}
