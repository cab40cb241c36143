//! Turns the raw text of a DOCTYPE's internal subset into a [`DtdModel`].
//!
//! The parser in `reader::core` hands this module the raw text it already extracted between
//! `<!DOCTYPE ... [` and `]`; nothing here touches the byte stream directly. Declarations are
//! recovered one `<!X ...>` block at a time; a block that doesn't parse contributes an entry
//! to the returned error list and is otherwise skipped — one bad `<!ATTLIST>` doesn't stop the
//! rest of the subset from being understood.

use std::collections::HashMap;

use crate::event::DtdErrorKind;
use crate::util::split_top_level;

use super::model::{AttrDef, AttrDefault, AttrType, ContentModel, DtdModel, EntityDef, NotationDef};

/// Parses every `<!ELEMENT>`, `<!ATTLIST>`, `<!ENTITY>` and `<!NOTATION>` declaration found in
/// `subset`, plus the document's root `Name` if `subset` came from a full DOCTYPE body (the
/// text right after `DOCTYPE`).
///
/// Returns the accumulated model together with one [`DtdErrorKind`] per declaration that
/// failed to parse.
#[must_use]
pub fn parse_internal_subset(subset: &str) -> (DtdModel, Vec<DtdErrorKind>) {
    let mut model = DtdModel::new();
    let mut errors = Vec::new();

    model.root_element = extract_root_name(subset);

    for block in iter_declarations(extract_bracketed(subset)) {
        let block = block.trim();
        if block.is_empty() || block.starts_with("--") {
            continue;
        }
        let Some(rest) = block.strip_prefix("ELEMENT") else {
            if let Some(rest) = block.strip_prefix("ATTLIST") {
                if parse_attlist(rest, &mut model).is_none() {
                    errors.push(DtdErrorKind::InvalidAttlistDecl);
                }
                continue;
            }
            if let Some(rest) = block.strip_prefix("ENTITY") {
                match parse_entity(rest, &mut model) {
                    Some(()) => {}
                    None => errors.push(DtdErrorKind::InvalidEntityDecl),
                }
                continue;
            }
            if let Some(rest) = block.strip_prefix("NOTATION") {
                if parse_notation(rest, &mut model).is_none() {
                    errors.push(DtdErrorKind::InvalidNotationDecl);
                }
                continue;
            }
            continue;
        };
        match parse_element(rest, &mut model) {
            Ok(()) => {}
            Err(true) => errors.push(DtdErrorKind::UnsupportedMixedOperators),
            Err(false) => errors.push(DtdErrorKind::InvalidElementDecl),
        }
    }

    (model, errors)
}

/// A fast, best-effort scan for `<!ENTITY name "value">`-style internal entities only, used by
/// the core parser to resolve `&name;` references while it is still assembling text and
/// attribute values (spec §1: "resource-reference expansion ... inside DTD and attribute
/// contexts are part of the core"). Ignores external/parameter entities, which have no inline
/// replacement text to substitute.
#[must_use]
pub(crate) fn quick_scan_internal_entities(subset: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for block in iter_declarations(extract_bracketed(subset)) {
        let block = block.trim();
        let Some(rest) = block.strip_prefix("ENTITY") else { continue };
        let rest = rest.trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let mut model = DtdModel::new();
        if parse_entity(rest, &mut model).is_some() {
            if let Some((name, EntityDef::Internal(value))) = model.entities.into_iter().next() {
                out.insert(name, value);
            }
        }
    }
    out
}

/// If `subset` is a full DOCTYPE body (`Name [ExternalID]? ['[' ... ']']?`), returns `Name`.
/// Tolerates a leading `DOCTYPE` keyword, since callers typically pass the whole `Event::Dtd`
/// content through unchanged.
fn extract_root_name(subset: &str) -> Option<String> {
    let trimmed = subset.trim_start();
    let trimmed = trimmed.strip_prefix("DOCTYPE").map_or(trimmed, str::trim_start);
    let mut chars = trimmed.char_indices();
    let (_, first) = chars.next()?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }
    let end = chars
        .find(|&(_, c)| c.is_whitespace() || c == '[' || c == '>')
        .map_or(trimmed.len(), |(i, _)| i);
    Some(trimmed[..end].to_owned())
}

/// Extracts the text between the first balanced `[` and `]` in `subset`, or the whole string
/// unchanged if `subset` already *is* internal-subset content with no surrounding DOCTYPE
/// header (no unmatched `[` found).
fn extract_bracketed(subset: &str) -> &str {
    let Some(start) = subset.find('[') else { return subset };
    let bytes = subset.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return &subset[start + 1..i];
                }
            }
            _ => {}
        }
    }
    &subset[start + 1..]
}

/// Splits internal-subset text into individual `<!...>` / `<?...?>` declaration bodies (the
/// text between `<!`/`<?` and the matching `>`), skipping comments and respecting quoted
/// strings so a `>` inside a literal doesn't end the declaration early.
fn iter_declarations(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'<' && bytes.get(i + 1) == Some(&b'!') {
            if text[i..].starts_with("<!--") {
                if let Some(end) = text[i + 4..].find("-->") {
                    i += 4 + end + 3;
                } else {
                    break;
                }
                continue;
            }
            let body_start = i + 2;
            let mut j = body_start;
            let mut quote: Option<u8> = None;
            let mut depth = 0i32;
            let mut closed_at = None;
            while j < bytes.len() {
                let b = bytes[j];
                match quote {
                    Some(q) if b == q => quote = None,
                    Some(_) => {}
                    None => match b {
                        b'"' | b'\'' => quote = Some(b),
                        b'(' => depth += 1,
                        b')' => depth -= 1,
                        b'>' if depth <= 0 => {
                            closed_at = Some(j);
                        }
                        _ => {}
                    },
                }
                if closed_at.is_some() {
                    break;
                }
                j += 1;
            }
            match closed_at {
                Some(end) => {
                    out.push(&text[body_start..end]);
                    i = end + 1;
                }
                None => break,
            }
        } else {
            i += 1;
        }
    }
    out
}

/// A content-model parse failure, distinguishing the one case `parse_internal_subset` reports
/// under its own [`DtdErrorKind`] (a group mixing `,` and `|`, `true`) from every other
/// malformed declaration (`false`).
type ContentError = bool;

fn parse_element(rest: &str, model: &mut DtdModel) -> Result<(), ContentError> {
    let rest = rest.trim_start();
    let (name, rest) = split_name(rest).ok_or(false)?;
    let spec = rest.trim();
    let content = parse_content_spec(spec)?;
    model.elements.insert(name, content);
    Ok(())
}

fn parse_content_spec(spec: &str) -> Result<ContentModel, ContentError> {
    let spec = spec.trim();
    match spec {
        "EMPTY" => Ok(ContentModel::Empty),
        "ANY" => Ok(ContentModel::Any),
        _ => parse_group(spec),
    }
}

fn strip_occurrence(s: &str) -> (&str, Option<char>) {
    match s.chars().last() {
        Some(c @ ('?' | '*' | '+')) => (&s[..s.len() - c.len_utf8()], Some(c)),
        _ => (s, None),
    }
}

fn wrap_occurrence(cm: ContentModel, occ: Option<char>) -> ContentModel {
    match occ {
        Some('?') => ContentModel::Optional(Box::new(cm)),
        Some('*') => ContentModel::ZeroOrMore(Box::new(cm)),
        Some('+') => ContentModel::OneOrMore(Box::new(cm)),
        _ => cm,
    }
}

fn parse_group(s: &str) -> Result<ContentModel, ContentError> {
    let (body, occ) = strip_occurrence(s.trim());
    let body = body.trim();
    let inner = body.strip_prefix('(').ok_or(false)?.strip_suffix(')').ok_or(false)?;
    let inner_trim = inner.trim();

    if inner_trim == "#PCDATA" {
        return Ok(wrap_occurrence(ContentModel::PCData, occ));
    }
    if inner_trim.starts_with("#PCDATA") {
        let names = split_top_level(inner_trim, '|')
            .into_iter()
            .map(str::trim)
            .filter(|p| *p != "#PCDATA")
            .map(str::to_owned)
            .collect();
        return Ok(wrap_occurrence(ContentModel::Mixed(names), occ));
    }

    let commas = split_top_level(inner, ',');
    let pipes = split_top_level(inner, '|');
    if commas.len() > 1 && pipes.len() > 1 {
        return Err(true);
    }

    let cm = if commas.len() > 1 {
        ContentModel::Seq(
            commas
                .into_iter()
                .map(parse_item)
                .collect::<Result<Vec<_>, _>>()?,
        )
    } else if pipes.len() > 1 {
        ContentModel::Choice(
            pipes
                .into_iter()
                .map(parse_item)
                .collect::<Result<Vec<_>, _>>()?,
        )
    } else {
        parse_item(inner)?
    };
    Ok(wrap_occurrence(cm, occ))
}

fn parse_item(s: &str) -> Result<ContentModel, ContentError> {
    let s = s.trim();
    let (body, occ) = strip_occurrence(s);
    if body.trim_start().starts_with('(') {
        return parse_group(s);
    }
    let name = body.trim();
    if name.is_empty() {
        return Err(false);
    }
    Ok(wrap_occurrence(ContentModel::Name(name.to_owned()), occ))
}

fn parse_attlist(rest: &str, model: &mut DtdModel) -> Option<()> {
    let rest = rest.trim_start();
    let (elem, rest) = split_name(rest)?;
    let tokens = tokenize_decl(rest);
    let defs = model.attributes.entry(elem).or_default();

    let mut i = 0usize;
    while i < tokens.len() {
        let name = tokens.get(i)?.word()?.to_owned();
        i += 1;
        let type_tok = tokens.get(i)?;
        let attr_type = parse_attr_type(type_tok)?;
        i += 1;
        let default_kw = tokens.get(i)?.word();
        let default = match default_kw {
            Some("#REQUIRED") => {
                i += 1;
                AttrDefault::Required
            }
            Some("#IMPLIED") => {
                i += 1;
                AttrDefault::Implied
            }
            Some("#FIXED") => {
                i += 1;
                let v = tokens.get(i)?.quoted()?.to_owned();
                i += 1;
                AttrDefault::Fixed(v)
            }
            _ => {
                let v = tokens.get(i)?.quoted()?.to_owned();
                i += 1;
                AttrDefault::Default(v)
            }
        };
        defs.push(AttrDef { name, attr_type, default });
    }
    Some(())
}

fn parse_attr_type(tok: &DeclToken<'_>) -> Option<AttrType> {
    match tok {
        DeclToken::Word(w) => match *w {
            // Longest-match first: IDREFS before IDREF, ID last.
            "CDATA" => Some(AttrType::CData),
            "IDREFS" => Some(AttrType::IdRefs),
            "IDREF" => Some(AttrType::IdRef),
            "ID" => Some(AttrType::Id),
            "ENTITIES" => Some(AttrType::Entities),
            "ENTITY" => Some(AttrType::Entity),
            "NMTOKENS" => Some(AttrType::NmTokens),
            "NMTOKEN" => Some(AttrType::NmToken),
            _ => None,
        },
        DeclToken::Group(g) => {
            let inner = g.strip_prefix('(')?.strip_suffix(')')?;
            Some(AttrType::Enumeration(
                split_top_level(inner, '|').into_iter().map(|s| s.trim().to_owned()).collect(),
            ))
        }
        DeclToken::NotationGroup(g) => {
            let inner = g
                .trim_start_matches("NOTATION")
                .trim_start()
                .strip_prefix('(')?
                .strip_suffix(')')?;
            Some(AttrType::Notation(
                split_top_level(inner, '|').into_iter().map(|s| s.trim().to_owned()).collect(),
            ))
        }
        DeclToken::Quoted(_) => None,
    }
}

fn parse_entity(rest: &str, model: &mut DtdModel) -> Option<()> {
    let rest = rest.trim_start();
    let (is_param, rest) = match rest.strip_prefix('%') {
        Some(r) => (true, r.trim_start()),
        None => (false, rest),
    };
    let (name, rest) = split_name(rest)?;
    let rest = rest.trim_start();

    if is_param {
        let value = parse_quoted_or_external_value(rest)?;
        model.param_entities.insert(name, value);
        return Some(());
    }

    if let Some(body) = rest.strip_prefix("SYSTEM") {
        let tokens = tokenize_decl(body.trim_start());
        let system_id = tokens.first()?.quoted()?.to_owned();
        if let Some(DeclToken::Word(kw)) = tokens.get(1) {
            if *kw == "NDATA" {
                let notation = tokens.get(2)?.word()?.to_owned();
                model.entities.insert(
                    name,
                    EntityDef::ExternalUnparsed { system_id, public_id: None, notation },
                );
                return Some(());
            }
        }
        model.entities.insert(name, EntityDef::External { system_id, public_id: None });
        return Some(());
    }
    if let Some(body) = rest.strip_prefix("PUBLIC") {
        let tokens = tokenize_decl(body.trim_start());
        let public_id = tokens.first()?.quoted()?.to_owned();
        let system_id = tokens.get(1)?.quoted()?.to_owned();
        if let Some(DeclToken::Word(kw)) = tokens.get(2) {
            if *kw == "NDATA" {
                let notation = tokens.get(3)?.word()?.to_owned();
                model.entities.insert(
                    name,
                    EntityDef::ExternalUnparsed { system_id, public_id: Some(public_id), notation },
                );
                return Some(());
            }
        }
        model
            .entities
            .insert(name, EntityDef::External { system_id, public_id: Some(public_id) });
        return Some(());
    }

    let value = tokenize_decl(rest).into_iter().next()?.quoted()?.to_owned();
    model.entities.insert(name, EntityDef::Internal(value));
    Some(())
}

fn parse_quoted_or_external_value(rest: &str) -> Option<String> {
    let tokens = tokenize_decl(rest);
    tokens.first()?.quoted().map(str::to_owned)
}

fn parse_notation(rest: &str, model: &mut DtdModel) -> Option<()> {
    let rest = rest.trim_start();
    let (name, rest) = split_name(rest)?;
    let tokens = tokenize_decl(rest);
    let mut def = NotationDef::default();
    if let Some(DeclToken::Word("SYSTEM")) = tokens.first() {
        def.system_id = Some(tokens.get(1)?.quoted()?.to_owned());
    } else if let Some(DeclToken::Word("PUBLIC")) = tokens.first() {
        def.public_id = Some(tokens.get(1)?.quoted()?.to_owned());
        if let Some(tok) = tokens.get(2) {
            def.system_id = Some(tok.quoted()?.to_owned());
        }
    } else {
        return None;
    }
    model.notations.insert(name, def);
    Some(())
}

fn split_name(s: &str) -> Option<(String, &str)> {
    let s = s.trim_start();
    let end = s.find(|c: char| c.is_whitespace()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((s[..end].to_owned(), &s[end..]))
}

/// One lexical item out of an `ATTLIST`/`ENTITY`/`NOTATION` tail: a bare word, a quoted
/// literal (content only, quotes stripped), a parenthesized enumeration group, or a
/// `NOTATION (...)` group.
enum DeclToken<'a> {
    Word(&'a str),
    Quoted(&'a str),
    Group(&'a str),
    NotationGroup(&'a str),
}

impl<'a> DeclToken<'a> {
    fn word(&self) -> Option<&'a str> {
        match self {
            DeclToken::Word(w) => Some(w),
            _ => None,
        }
    }

    fn quoted(&self) -> Option<&'a str> {
        match self {
            DeclToken::Quoted(q) => Some(q),
            _ => None,
        }
    }
}

/// Splits a declaration's tail into [`DeclToken`]s: whitespace-delimited outside of quotes and
/// parens, with quoted literals and parenthesized groups each collapsed to one token so an
/// enumeration like `(a | b | c)` survives as a single item even though it contains spaces.
fn tokenize_decl(s: &str) -> Vec<DeclToken<'_>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'"' | b'\'' => {
                let quote = bytes[i];
                let start = i + 1;
                let mut j = start;
                while j < bytes.len() && bytes[j] != quote {
                    j += 1;
                }
                out.push(DeclToken::Quoted(&s[start..j]));
                i = (j + 1).min(bytes.len());
            }
            b'(' => {
                let start = i;
                let mut depth = 0i32;
                let mut j = i;
                while j < bytes.len() {
                    match bytes[j] {
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                j += 1;
                                break;
                            }
                        }
                        _ => {}
                    }
                    j += 1;
                }
                out.push(DeclToken::Group(&s[start..j]));
                i = j;
            }
            _ => {
                let start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'(' {
                    i += 1;
                }
                let word = &s[start..i];
                if word.eq_ignore_ascii_case("NOTATION") {
                    // Swallow the following `(...)` group into one NotationGroup token.
                    let ws_end = {
                        let mut k = i;
                        while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                            k += 1;
                        }
                        k
                    };
                    if bytes.get(ws_end) == Some(&b'(') {
                        let mut depth = 0i32;
                        let mut j = ws_end;
                        while j < bytes.len() {
                            match bytes[j] {
                                b'(' => depth += 1,
                                b')' => {
                                    depth -= 1;
                                    if depth == 0 {
                                        j += 1;
                                        break;
                                    }
                                }
                                _ => {}
                            }
                            j += 1;
                        }
                        out.push(DeclToken::NotationGroup(&s[start..j]));
                        i = j;
                        continue;
                    }
                }
                out.push(DeclToken::Word(word));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_empty_and_any() {
        let (model, errors) = parse_internal_subset("<!ELEMENT a EMPTY><!ELEMENT b ANY>");
        assert!(errors.is_empty());
        assert_eq!(model.elements["a"], ContentModel::Empty);
        assert_eq!(model.elements["b"], ContentModel::Any);
    }

    #[test]
    fn element_sequence_and_choice() {
        let (model, _) = parse_internal_subset("<!ELEMENT a (b,c)><!ELEMENT d (e|f)+>");
        assert_eq!(
            model.elements["a"],
            ContentModel::Seq(vec![ContentModel::Name("b".into()), ContentModel::Name("c".into())])
        );
        assert_eq!(
            model.elements["d"],
            ContentModel::OneOrMore(Box::new(ContentModel::Choice(vec![
                ContentModel::Name("e".into()),
                ContentModel::Name("f".into())
            ])))
        );
    }

    #[test]
    fn element_mixed_content() {
        let (model, _) = parse_internal_subset("<!ELEMENT a (#PCDATA|b|c)*>");
        assert_eq!(
            model.elements["a"],
            ContentModel::Mixed(vec!["b".into(), "c".into()])
        );
    }

    #[test]
    fn mixed_operators_are_unsupported() {
        let (_, errors) = parse_internal_subset("<!ELEMENT a (b,c|d)>");
        assert_eq!(errors, vec![DtdErrorKind::UnsupportedMixedOperators]);
    }

    #[test]
    fn attlist_types_and_defaults() {
        let (model, errors) = parse_internal_subset(
            r#"<!ATTLIST a id ID #REQUIRED class CDATA #IMPLIED kind (x|y) "x" lang NMTOKEN #FIXED "en">"#,
        );
        assert!(errors.is_empty());
        let defs = &model.attributes["a"];
        assert_eq!(defs[0], AttrDef { name: "id".into(), attr_type: AttrType::Id, default: AttrDefault::Required });
        assert_eq!(defs[1].attr_type, AttrType::CData);
        assert_eq!(defs[2].attr_type, AttrType::Enumeration(vec!["x".into(), "y".into()]));
        assert_eq!(defs[2].default, AttrDefault::Default("x".into()));
        assert_eq!(defs[3].default, AttrDefault::Fixed("en".into()));
    }

    #[test]
    fn entity_forms() {
        let (model, errors) = parse_internal_subset(
            r#"<!ENTITY a "val"><!ENTITY b SYSTEM 'uri'><!ENTITY c PUBLIC 'pub' 'uri'><!ENTITY d SYSTEM 'uri' NDATA note><!ENTITY % e 'pval'>"#,
        );
        assert!(errors.is_empty());
        assert_eq!(model.entities["a"], EntityDef::Internal("val".into()));
        assert_eq!(model.entities["b"], EntityDef::External { system_id: "uri".into(), public_id: None });
        assert_eq!(
            model.entities["c"],
            EntityDef::External { system_id: "uri".into(), public_id: Some("pub".into()) }
        );
        assert_eq!(
            model.entities["d"],
            EntityDef::ExternalUnparsed { system_id: "uri".into(), public_id: None, notation: "note".into() }
        );
        assert_eq!(model.param_entities["e"], "pval");
    }

    #[test]
    fn notation_forms() {
        let (model, errors) = parse_internal_subset("<!NOTATION a SYSTEM 'uri'><!NOTATION b PUBLIC 'pub'>");
        assert!(errors.is_empty());
        assert_eq!(model.notations["a"].system_id.as_deref(), Some("uri"));
        assert_eq!(model.notations["b"].public_id.as_deref(), Some("pub"));
    }

    #[test]
    fn root_name_extracted_from_full_doctype_body() {
        let subset = "note SYSTEM \"note.dtd\"";
        assert_eq!(extract_root_name(subset), Some("note".to_owned()));
    }

    #[test]
    fn quick_scan_finds_internal_entities_only() {
        let entities = quick_scan_internal_entities(r#"<!ENTITY a "x"><!ENTITY b SYSTEM 'uri'>"#);
        assert_eq!(entities.get("a").map(String::as_str), Some("x"));
        assert!(!entities.contains_key("b"));
    }
}
