//! Framework types the generator knows without seeing their declarations.

/// A predefined (keyword) type and the CLR type it aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredefinedType {
    pub keyword: &'static str,
    pub full_name: &'static str,
    pub is_reference_type: bool,
}

const fn predefined(keyword: &'static str, full_name: &'static str, is_reference_type: bool) -> PredefinedType {
    PredefinedType {
        keyword,
        full_name,
        is_reference_type,
    }
}

pub const PREDEFINED: &[PredefinedType] = &[
    predefined("bool", "System.Boolean", false),
    predefined("byte", "System.Byte", false),
    predefined("sbyte", "System.SByte", false),
    predefined("char", "System.Char", false),
    predefined("decimal", "System.Decimal", false),
    predefined("double", "System.Double", false),
    predefined("float", "System.Single", false),
    predefined("int", "System.Int32", false),
    predefined("uint", "System.UInt32", false),
    predefined("nint", "System.IntPtr", false),
    predefined("nuint", "System.UIntPtr", false),
    predefined("long", "System.Int64", false),
    predefined("ulong", "System.UInt64", false),
    predefined("short", "System.Int16", false),
    predefined("ushort", "System.UInt16", false),
    predefined("object", "System.Object", true),
    predefined("string", "System.String", true),
];

pub fn predefined_by_keyword(keyword: &str) -> Option<&'static PredefinedType> {
    PREDEFINED.iter().find(|p| p.keyword == keyword)
}

pub fn predefined_by_full_name(full_name: &str) -> Option<&'static PredefinedType> {
    PREDEFINED.iter().find(|p| p.full_name == full_name)
}

/// A well-known framework type: namespace, simple name, generic arity, reference-ness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownType {
    pub namespace: &'static str,
    pub name: &'static str,
    pub arity: usize,
    pub is_reference_type: bool,
}

const fn known(namespace: &'static str, name: &'static str, arity: usize, is_reference_type: bool) -> WellKnownType {
    WellKnownType {
        namespace,
        name,
        arity,
        is_reference_type,
    }
}

const SYSTEM: &str = "System";
const GENERIC: &str = "System.Collections.Generic";
const IMMUTABLE: &str = "System.Collections.Immutable";
const THREADING: &str = "System.Threading";
const TASKS: &str = "System.Threading.Tasks";
const JSON: &str = "System.Text.Json";
const JSON_NODES: &str = "System.Text.Json.Nodes";
const IO: &str = "System.IO";

pub const WELL_KNOWN: &[WellKnownType] = &[
    known(SYSTEM, "Boolean", 0, false),
    known(SYSTEM, "Byte", 0, false),
    known(SYSTEM, "SByte", 0, false),
    known(SYSTEM, "Char", 0, false),
    known(SYSTEM, "Decimal", 0, false),
    known(SYSTEM, "Double", 0, false),
    known(SYSTEM, "Single", 0, false),
    known(SYSTEM, "Int16", 0, false),
    known(SYSTEM, "UInt16", 0, false),
    known(SYSTEM, "Int32", 0, false),
    known(SYSTEM, "UInt32", 0, false),
    known(SYSTEM, "Int64", 0, false),
    known(SYSTEM, "UInt64", 0, false),
    known(SYSTEM, "IntPtr", 0, false),
    known(SYSTEM, "UIntPtr", 0, false),
    known(SYSTEM, "Object", 0, true),
    known(SYSTEM, "String", 0, true),
    known(SYSTEM, "DateTime", 0, false),
    known(SYSTEM, "DateTimeOffset", 0, false),
    known(SYSTEM, "DateOnly", 0, false),
    known(SYSTEM, "TimeOnly", 0, false),
    known(SYSTEM, "TimeSpan", 0, false),
    known(SYSTEM, "Guid", 0, false),
    known(SYSTEM, "Half", 0, false),
    known(SYSTEM, "Int128", 0, false),
    known(SYSTEM, "UInt128", 0, false),
    known(SYSTEM, "Uri", 0, true),
    known(SYSTEM, "Version", 0, true),
    known(SYSTEM, "Exception", 0, true),
    known(SYSTEM, "Nullable", 1, false),
    known(SYSTEM, "Lazy", 1, true),
    known(SYSTEM, "Tuple", 1, true),
    known(SYSTEM, "Tuple", 2, true),
    known(SYSTEM, "Tuple", 3, true),
    known(SYSTEM, "Tuple", 4, true),
    known(SYSTEM, "ValueTuple", 1, false),
    known(SYSTEM, "ValueTuple", 2, false),
    known(SYSTEM, "ValueTuple", 3, false),
    known(SYSTEM, "ValueTuple", 4, false),
    known(SYSTEM, "Memory", 1, false),
    known(SYSTEM, "ReadOnlyMemory", 1, false),
    known(GENERIC, "IEnumerable", 1, true),
    known(GENERIC, "IAsyncEnumerable", 1, true),
    known(GENERIC, "ICollection", 1, true),
    known(GENERIC, "IReadOnlyCollection", 1, true),
    known(GENERIC, "IList", 1, true),
    known(GENERIC, "IReadOnlyList", 1, true),
    known(GENERIC, "ISet", 1, true),
    known(GENERIC, "IReadOnlySet", 1, true),
    known(GENERIC, "IDictionary", 2, true),
    known(GENERIC, "IReadOnlyDictionary", 2, true),
    known(GENERIC, "List", 1, true),
    known(GENERIC, "LinkedList", 1, true),
    known(GENERIC, "HashSet", 1, true),
    known(GENERIC, "SortedSet", 1, true),
    known(GENERIC, "Queue", 1, true),
    known(GENERIC, "Stack", 1, true),
    known(GENERIC, "Dictionary", 2, true),
    known(GENERIC, "SortedDictionary", 2, true),
    known(GENERIC, "KeyValuePair", 2, false),
    known(IMMUTABLE, "ImmutableArray", 1, false),
    known(IMMUTABLE, "ImmutableList", 1, true),
    known(IMMUTABLE, "ImmutableHashSet", 1, true),
    known(IMMUTABLE, "ImmutableDictionary", 2, true),
    known(IMMUTABLE, "IImmutableList", 1, true),
    known(IMMUTABLE, "IImmutableDictionary", 2, true),
    known(THREADING, "CancellationToken", 0, false),
    known(TASKS, "Task", 0, true),
    known(TASKS, "Task", 1, true),
    known(TASKS, "ValueTask", 0, false),
    known(TASKS, "ValueTask", 1, false),
    known(JSON, "JsonElement", 0, false),
    known(JSON, "JsonDocument", 0, true),
    known(JSON_NODES, "JsonNode", 0, true),
    known(JSON_NODES, "JsonObject", 0, true),
    known(JSON_NODES, "JsonArray", 0, true),
    known(JSON_NODES, "JsonValue", 0, true),
    known(IO, "Stream", 0, true),
    known(IO, "FileInfo", 0, true),
];
