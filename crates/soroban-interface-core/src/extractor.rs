//! Interface extractor: turns `stellar contract info interface` style text into
//! a [`ContractInterface`].
//!
//! Only a narrow subset of Rust surface syntax is understood: the client trait
//! with `fn` signatures terminated by `;`, and top-level `pub struct` /
//! `pub enum` blocks. Anything else is ignored. A block that does not match
//! its expected shape is skipped and reported in [`Extraction::skipped`],
//! never raised as an error.

use crate::scanner::{Block, BlockKind, BlockScanner};
use crate::splitter::{split_declarations, split_top_level};
use crate::types::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

lazy_static! {
    static ref METHOD_HEAD: Regex = Regex::new(r"^fn\s+(\w+)\s*\(").unwrap();
    static ref STRUCT_BLOCK: Regex = Regex::new(r"^pub struct\s+(\w+)\s*\{([^}]*)\}").unwrap();
    static ref ENUM_BLOCK: Regex = Regex::new(r"^pub enum\s+(\w+)\s*\{([^}]*)\}").unwrap();
    static ref TUPLE_VARIANT: Regex = Regex::new(r"(?s)^(\w+)\((.*)\)$").unwrap();
}

const TRAIT_KEYWORD: &str = "pub trait";

/// Attribute spellings that mark an enum as the contract's error type
const ERROR_ATTRIBUTES: [&str; 2] = ["#[contracterror]", "#[soroban_sdk::contracterror"];

/// Knobs for the extractor; defaults match the Soroban CLI output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorOptions {
    /// Namespace prefix removed from every retained type string
    pub namespace_prefix: String,
    /// Type of the implicit environment parameter, which is never materialized
    pub env_type: String,
    /// Contract name used when the text has no trait declaration
    pub default_contract_name: String,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            namespace_prefix: "soroban_sdk::".to_string(),
            env_type: "Env".to_string(),
            default_contract_name: "DefaultContractName".to_string(),
        }
    }
}

/// Why a block was left out of the interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum BlockError {
    #[error("method block does not start with `fn <name>(`")]
    MalformedMethodHead,

    #[error("method parameter list is never closed")]
    UnclosedParameters,

    #[error("method signature is not terminated by `;`")]
    MissingTerminator,

    #[error("struct block does not match `pub struct <Name> {{ ... }}`")]
    MalformedStruct,

    #[error("enum block does not match `pub enum <Name> {{ ... }}`")]
    MalformedEnum,
}

/// A block the extractor dropped, with where it started and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBlock {
    pub kind: BlockKind,
    pub line: usize,
    pub reason: BlockError,
}

/// Outcome of one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub interface: ContractInterface,
    pub skipped: Vec<SkippedBlock>,
}

enum ParsedBlock {
    Method(ContractMethod),
    Struct(ContractStruct),
    Enum(ContractEnum),
}

/// Extracts a contract interface from its textual description
#[derive(Debug, Clone, Default)]
pub struct InterfaceExtractor {
    options: ExtractorOptions,
}

impl InterfaceExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExtractorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Parse the text and keep only the interface
    pub fn parse(&self, source: &str) -> ContractInterface {
        self.extract(source).interface
    }

    /// Parse the text, also returning the blocks that were skipped
    pub fn extract(&self, source: &str) -> Extraction {
        let lines: Vec<&str> = source.lines().map(str::trim).collect();

        let mut interface = ContractInterface::new(self.contract_name(&lines));
        let mut skipped = Vec::new();

        for block in BlockScanner::scan(&lines) {
            match self.parse_block(&block) {
                Ok(ParsedBlock::Method(method)) => interface.methods.push(method),
                Ok(ParsedBlock::Struct(item)) => interface.structs.push(item),
                Ok(ParsedBlock::Enum(item)) => interface.enums.push(item),
                Err(reason) => {
                    debug!(
                        kind = %block.kind,
                        line = block.start_line,
                        reason = %reason,
                        "skipping block"
                    );
                    skipped.push(SkippedBlock {
                        kind: block.kind,
                        line: block.start_line,
                        reason,
                    });
                }
            }
        }

        debug!(
            contract = %interface.name,
            methods = interface.methods.len(),
            structs = interface.structs.len(),
            enums = interface.enums.len(),
            skipped = skipped.len(),
            "interface extracted"
        );

        Extraction { interface, skipped }
    }

    fn contract_name(&self, lines: &[&str]) -> String {
        lines
            .iter()
            .find_map(|line| line.strip_prefix(TRAIT_KEYWORD))
            .map(|rest| rest.split('{').next().unwrap_or_default().trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(self.options.default_contract_name.as_str())
            .to_string()
    }

    fn parse_block(&self, block: &Block<'_>) -> Result<ParsedBlock, BlockError> {
        match block.kind {
            BlockKind::Method => self.parse_method(&block.text()).map(ParsedBlock::Method),
            BlockKind::Struct => self
                .parse_struct(&without_comments(&block.lines))
                .map(ParsedBlock::Struct),
            BlockKind::Enum => self.parse_enum(block).map(ParsedBlock::Enum),
        }
    }

    fn parse_method(&self, text: &str) -> Result<ContractMethod, BlockError> {
        let head = METHOD_HEAD
            .captures(text)
            .ok_or(BlockError::MalformedMethodHead)?;
        let name = head[1].to_string();
        let open = head.get(0).map_or(0, |m| m.end() - 1);

        let close = find_closing_paren(text, open).ok_or(BlockError::UnclosedParameters)?;
        let parameters = self.parse_parameters(&text[open + 1..close]);

        let rest = text[close + 1..].trim_start();
        let return_type = if let Some(after_arrow) = rest.strip_prefix("->") {
            let end = after_arrow.find(';').ok_or(BlockError::MissingTerminator)?;
            self.normalize_return_type(&after_arrow[..end])
        } else if rest.starts_with(';') {
            UNIT_TYPE.to_string()
        } else {
            return Err(BlockError::MissingTerminator);
        };

        Ok(ContractMethod::new(name, parameters, return_type))
    }

    fn parse_parameters(&self, params_text: &str) -> Vec<ContractParameter> {
        split_top_level(&self.strip_namespace(params_text))
            .into_iter()
            .filter_map(|item| {
                let (name, param_type) = item.split_once(':')?;
                let name = name.trim();
                let param_type = normalize_type(param_type);
                if name.is_empty() || param_type.is_empty() {
                    trace!(item = %item, "dropping malformed parameter");
                    return None;
                }
                if param_type == self.options.env_type {
                    return None;
                }
                Some(ContractParameter::new(name, param_type))
            })
            .collect()
    }

    /// Comma segments are trimmed and re-joined with `, `; empty segments are dropped
    fn normalize_return_type(&self, raw: &str) -> String {
        let joined = self
            .strip_namespace(raw)
            .split(',')
            .map(normalize_type)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if joined.is_empty() {
            UNIT_TYPE.to_string()
        } else {
            normalize_type(&joined)
        }
    }

    fn parse_struct(&self, text: &str) -> Result<ContractStruct, BlockError> {
        let caps = STRUCT_BLOCK.captures(text).ok_or(BlockError::MalformedStruct)?;
        let fields = split_declarations(&self.strip_namespace(&caps[2]))
            .iter()
            .filter_map(|item| parse_field(item))
            .collect();

        Ok(ContractStruct {
            name: caps[1].to_string(),
            fields,
        })
    }

    fn parse_enum(&self, block: &Block<'_>) -> Result<ContractEnum, BlockError> {
        let body = without_comments(&block.lines);
        let caps = ENUM_BLOCK.captures(&body).ok_or(BlockError::MalformedEnum)?;
        let variants = split_declarations(&self.strip_namespace(&caps[2]))
            .iter()
            .filter_map(|item| parse_variant(item))
            .collect();

        let text = block.text();
        let attributes = block.attribute_text();
        let is_error = ERROR_ATTRIBUTES
            .iter()
            .any(|marker| text.contains(marker) || attributes.contains(marker));

        Ok(ContractEnum {
            name: caps[1].to_string(),
            variants,
            is_error,
        })
    }

    fn strip_namespace(&self, text: &str) -> String {
        if self.options.namespace_prefix.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.options.namespace_prefix, "")
        }
    }
}

/// Parse with default options
pub fn parse_interface(source: &str) -> ContractInterface {
    InterfaceExtractor::new().parse(source)
}

/// Block text without comment and attribute lines, and with `//` tails cut off
fn without_comments(lines: &[&str]) -> String {
    lines
        .iter()
        .filter(|line| !(line.starts_with("//") || line.starts_with("#[")))
        .map(|line| strip_line_comment(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_field(item: &str) -> Option<ContractField> {
    let (left, field_type) = item.split_once(':')?;
    let left = left.trim();
    let field_type = normalize_type(field_type);

    let (visibility, name) = match left.strip_prefix("pub") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (Visibility::Public, rest.trim()),
        _ => (Visibility::Private, left),
    };

    if name.is_empty() || field_type.is_empty() {
        trace!(item = %item, "dropping malformed field");
        return None;
    }

    Some(ContractField {
        name: name.to_string(),
        field_type,
        visibility,
    })
}

fn parse_variant(item: &str) -> Option<EnumVariant> {
    if let Some((name, value)) = item.split_once('=') {
        let name = name.trim();
        return match value.trim().parse::<i64>() {
            Ok(value) if !name.is_empty() => Some(EnumVariant::discriminant(name, value)),
            _ => {
                trace!(item = %item, "dropping variant with invalid discriminant");
                None
            }
        };
    }

    if let Some(caps) = TUPLE_VARIANT.captures(item) {
        return Some(EnumVariant::payload(&caps[1], normalize_type(&caps[2])));
    }

    Some(EnumVariant::unit(item.trim()))
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => line[..idx].trim_end(),
        None => line,
    }
}

/// Byte index of the `)` matching the `(` at `open`
fn find_closing_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Collapse whitespace runs so multi-line declarations read like single-line ones
fn normalize_type(raw: &str) -> String {
    let collapsed = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("< ", "<")
        .replace("( ", "(")
        .replace(" >", ">")
        .replace(" )", ")")
        .replace(" ,", ",");
    drop_trailing_commas(&collapsed)
}

/// Remove the comma a multi-line list leaves before its closing bracket.
///
/// `(T,)` is a one-element tuple, not `(T)`, so a parenthesized group keeps
/// its trailing comma unless it holds more than one item.
fn drop_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    // top-level commas seen in each open group
    let mut commas: Vec<usize> = Vec::new();

    for (idx, &c) in chars.iter().enumerate() {
        match c {
            '<' | '(' => commas.push(0),
            '>' | ')' => {
                commas.pop();
            }
            ',' => {
                let seen = commas.last_mut().map(|n| {
                    *n += 1;
                    *n
                });
                let trailing = match chars.get(idx + 1) {
                    Some('>') => true,
                    Some(')') => seen.map_or(false, |n| n > 1),
                    _ => false,
                };
                if trailing {
                    continue;
                }
            }
            _ => {}
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_name_from_trait() {
        let interface = parse_interface("#[soroban_sdk::contractclient(name = \"Client\")]\npub trait Token {\n}");
        assert_eq!(interface.name, "Token");
    }

    #[test]
    fn test_default_contract_name() {
        let interface = parse_interface("pub struct Something {");
        assert_eq!(interface.name, "DefaultContractName");

        let extractor = InterfaceExtractor::with_options(ExtractorOptions {
            default_contract_name: "Unnamed".to_string(),
            ..ExtractorOptions::default()
        });
        assert_eq!(extractor.parse("").name, "Unnamed");
    }

    #[test]
    fn test_method_drops_env_and_strips_namespace() {
        let interface = parse_interface(
            "fn transfer(env: soroban_sdk::Env, from: soroban_sdk::Address, amount: i128) -> Result<soroban_sdk::Address, Error>;",
        );
        let method = &interface.methods[0];
        assert_eq!(method.name, "transfer");
        assert_eq!(
            method.parameters,
            vec![
                ContractParameter::new("from", "Address"),
                ContractParameter::new("amount", "i128"),
            ]
        );
        assert_eq!(method.return_type, "Result<Address, Error>");
    }

    #[test]
    fn test_method_without_return_type_is_unit() {
        let interface = parse_interface("fn set_admin(env: Env, admin: Address);");
        assert_eq!(interface.methods[0].return_type, "()");
        assert_eq!(interface.methods[0].parameters.len(), 1);
    }

    #[test]
    fn test_zero_parameters() {
        let interface = parse_interface("fn get_value() -> u32;");
        assert!(interface.methods[0].parameters.is_empty());
    }

    #[test]
    fn test_return_type_commas_normalized() {
        let interface = parse_interface("fn pair(env: Env) -> (u32,u32 ,  soroban_sdk::Symbol);");
        assert_eq!(interface.methods[0].return_type, "(u32, u32, Symbol)");
    }

    #[test]
    fn test_nested_parens_in_parameters() {
        let interface = parse_interface("fn put(key: (Address, u64), v: Option<(u32, u32)>) -> ();");
        let params = &interface.methods[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].param_type, "(Address, u64)");
        assert_eq!(params[1].param_type, "Option<(u32, u32)>");
    }

    #[test]
    fn test_unclosed_method_is_skipped() {
        let extraction = InterfaceExtractor::new().extract("fn invalid_method(;\nfn ok() -> u32;");
        assert_eq!(extraction.interface.methods.len(), 1);
        assert_eq!(extraction.interface.methods[0].name, "ok");
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].reason, BlockError::UnclosedParameters);
        assert_eq!(extraction.skipped[0].line, 1);
    }

    #[test]
    fn test_missing_terminator_is_skipped() {
        let extraction = InterfaceExtractor::new().extract("fn no_semicolon() -> u32");
        assert!(extraction.interface.methods.is_empty());
        assert_eq!(extraction.skipped[0].reason, BlockError::MissingTerminator);
    }

    #[test]
    fn test_field_visibility() {
        assert_eq!(
            parse_field("pub address: Address").map(|f| f.visibility),
            Some(Visibility::Public)
        );
        let private = parse_field("balance: u64").unwrap();
        assert_eq!(private.visibility, Visibility::Private);
        assert_eq!(private.name, "balance");
        // `public_key` starts with the letters "pub" but is not the keyword
        let tricky = parse_field("public_key: BytesN<32>").unwrap();
        assert_eq!(tricky.visibility, Visibility::Private);
        assert_eq!(tricky.name, "public_key");
    }

    #[test]
    fn test_field_without_colon_or_type_dropped() {
        assert!(parse_field("field1 String").is_none());
        assert!(parse_field("pub name:").is_none());
        assert!(parse_field(": u32").is_none());
    }

    #[test]
    fn test_variant_shapes() {
        assert_eq!(parse_variant("NotFound = 404"), Some(EnumVariant::discriminant("NotFound", 404)));
        assert_eq!(parse_variant("Neg = -1"), Some(EnumVariant::discriminant("Neg", -1)));
        assert_eq!(
            parse_variant("Transfer(Address, Address, u64)"),
            Some(EnumVariant::payload("Transfer", "Address, Address, u64"))
        );
        assert_eq!(parse_variant("Active"), Some(EnumVariant::unit("Active")));
        assert_eq!(parse_variant("Broken = one"), None);
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type(" Map<\n String,\n u32\n>"), "Map<String, u32>");
        assert_eq!(normalize_type("Vec<u8>"), "Vec<u8>");
        assert_eq!(normalize_type("(\n Address,\n Val,\n)"), "(Address, Val)");
        assert_eq!(normalize_type("Vec<\n u32,\n>"), "Vec<u32>");
    }

    #[test]
    fn test_single_element_tuple_keeps_comma() {
        assert_eq!(normalize_type("(u32,)"), "(u32,)");
        assert_eq!(normalize_type("((u32,), u64,)"), "((u32,), u64)");
        assert_eq!(normalize_type("Option<(\n Address,\n)>"), "Option<(Address,)>");

        let interface = parse_interface("fn f(env: Env, x: (u32,)) -> (u32,);");
        let method = &interface.methods[0];
        assert_eq!(method.parameters, vec![ContractParameter::new("x", "(u32,)")]);
        assert_eq!(method.return_type, "(u32,)");
    }

    #[test]
    fn test_struct_doc_comments_ignored() {
        let source = "pub struct Cfg {\n/// Fee (in stroops\npub fee: u32,\n/// The owner, note: must sign\n#[doc = \"a, b\"]\npub owner: Address, // signer\npub admin: Address // no comma\n}";
        let interface = parse_interface(source);
        let cfg = &interface.structs[0];
        assert_eq!(cfg.field_names(), vec!["fee", "owner", "admin"]);
        assert_eq!(cfg.fields[1].field_type, "Address");
        assert_eq!(cfg.fields[2].field_type, "Address");
    }

    #[test]
    fn test_enum_doc_comments_ignored() {
        let source = "pub enum Status {\n/// Pending, not yet confirmed\nPending,\n/// Done (finally\n#[doc = \"a, b = 1\"]\nDone = 2, // settled\n}";
        let interface = parse_interface(source);
        let status = &interface.enums[0];
        assert_eq!(
            status.variants,
            vec![EnumVariant::unit("Pending"), EnumVariant::discriminant("Done", 2)]
        );
    }

    #[test]
    fn test_custom_namespace_prefix() {
        let extractor = InterfaceExtractor::with_options(ExtractorOptions {
            namespace_prefix: "sdk::".to_string(),
            ..ExtractorOptions::default()
        });
        let interface = extractor.parse("fn f(env: sdk::Env, a: sdk::Address);");
        assert_eq!(interface.methods[0].parameters, vec![ContractParameter::new("a", "Address")]);
    }
}
