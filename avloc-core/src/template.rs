//! Placeholder templates for macro and script documents.
//!
//! Template text uses `$name` or `${name}` for placeholders, `$$` for a
//! literal dollar sign. Names start with a letter or underscore and continue
//! with letters, digits or underscores. Any other character following a `$`
//! is rejected when the template is parsed, so a template that loads
//! successfully can only fail at render time because of a missing value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::util;

/// Values bound to placeholder names for a single render.
pub type Bindings = HashMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Placeholder(String),
}

/// Parsed template, immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses template text.
    pub fn parse(text: &str) -> Result<Template> {
        let mut segments = Vec::new();
        let mut buf = String::new();
        let mut line = 1;
        let mut column = 1;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                buf.push(c);
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
                continue;
            }
            let invalid = Error::InvalidPlaceholder { line, column };
            match chars.peek().copied() {
                Some('$') => {
                    chars.next();
                    buf.push('$');
                    column += 2;
                }
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) if is_name_char(c, name.is_empty()) => name.push(c),
                            _ => return Err(invalid),
                        }
                    }
                    if name.is_empty() {
                        return Err(invalid);
                    }
                    column += name.chars().count() + 3;
                    flush_text(&mut segments, &mut buf);
                    segments.push(Segment::Placeholder(name));
                }
                Some(c) if is_name_char(c, true) => {
                    let mut name = String::new();
                    while let Some(&c) = chars.peek() {
                        if !is_name_char(c, name.is_empty()) {
                            break;
                        }
                        name.push(c);
                        chars.next();
                    }
                    column += name.chars().count() + 1;
                    flush_text(&mut segments, &mut buf);
                    segments.push(Segment::Placeholder(name));
                }
                _ => return Err(invalid),
            }
        }
        flush_text(&mut segments, &mut buf);

        Ok(Template { segments })
    }

    /// Reads and parses the template file at the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Template> {
        let path = path.as_ref();
        let text = util::read_text_file(path).map_err(|source| Error::TemplateLoad {
            path: PathBuf::from(path),
            source,
        })?;
        debug!(
            "loaded template {} ({} bytes)",
            path.to_string_lossy(),
            text.len()
        );
        Template::parse(&text)
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Makes sure every placeholder in the template is one `P` supplies.
    pub fn check_supplied<P: Params>(&self, template: &str) -> Result<()> {
        for name in self.placeholders() {
            if !P::names().contains(&name) {
                if let Some(similar) = util::get_similar(name, P::names()) {
                    warn!(
                        "{} template: unknown placeholder \"{}\", did you mean \"{}\"?",
                        template, name, similar
                    );
                }
                return Err(Error::UnsupportedPlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Substitutes all placeholders. Bindings with no matching placeholder
    /// are ignored.
    pub fn render(&self, bindings: &Bindings) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => match bindings.get(name.as_str()) {
                    Some(value) => out.push_str(value),
                    None => return Err(Error::MissingPlaceholder(name.clone())),
                },
            }
        }
        Ok(out)
    }
}

fn is_name_char(c: char, first: bool) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (!first && c.is_ascii_digit())
}

fn flush_text(segments: &mut Vec<Segment>, buf: &mut String) {
    if !buf.is_empty() {
        segments.push(Segment::Text(std::mem::take(buf)));
    }
}

/// Typed set of values for one kind of template.
pub trait Params {
    /// Placeholder names this set supplies.
    fn names() -> &'static [&'static str];
    fn bindings(&self) -> Bindings;
}

/// Values substituted into the simulation macro.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroParams {
    pub disp: f64,
    pub number: String,
    pub events: u32,
}

impl Params for MacroParams {
    fn names() -> &'static [&'static str] {
        &["Disp", "Number", "Events"]
    }

    fn bindings(&self) -> Bindings {
        let mut map = Bindings::new();
        map.insert("Disp", util::fmt_float(self.disp));
        map.insert("Number", self.number.clone());
        map.insert("Events", self.events.to_string());
        map
    }
}

/// Values substituted into the submission script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptParams {
    pub macro_path: PathBuf,
    pub output: PathBuf,
    pub log: PathBuf,
}

impl Params for ScriptParams {
    fn names() -> &'static [&'static str] {
        &["Macro", "Output", "Log"]
    }

    fn bindings(&self) -> Bindings {
        let mut map = Bindings::new();
        map.insert("Macro", self.macro_path.to_string_lossy().to_string());
        map.insert("Output", self.output.to_string_lossy().to_string());
        map.insert("Log", self.log.to_string_lossy().to_string());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(pairs: &[(&'static str, &str)]) -> Bindings {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn render_plain_and_braced() {
        let tmpl = Template::parse("/rat/pos $Disp mm\n/gen ${Number}_x $$5").unwrap();
        let out = tmpl
            .render(&bind(&[("Disp", "0.0"), ("Number", "FT033A")]))
            .unwrap();
        assert_eq!(out, "/rat/pos 0.0 mm\n/gen FT033A_x $5");
    }

    #[test]
    fn name_stops_at_non_identifier_char() {
        let tmpl = Template::parse("$Events.root $a1b-c").unwrap();
        assert_eq!(tmpl.placeholders(), vec!["Events", "a1b"]);
    }

    #[test]
    fn placeholders_are_distinct_in_order() {
        let tmpl = Template::parse("$Log ${Macro} $Log $Output").unwrap();
        assert_eq!(tmpl.placeholders(), vec!["Log", "Macro", "Output"]);
    }

    #[test]
    fn missing_value_fails_without_partial_output() {
        let tmpl = Template::parse("a $Disp b $Events").unwrap();
        match tmpl.render(&bind(&[("Disp", "1.0")])) {
            Err(Error::MissingPlaceholder(name)) => assert_eq!(name, "Events"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn extra_bindings_are_ignored() {
        let tmpl = Template::parse("only $Number").unwrap();
        let out = tmpl
            .render(&bind(&[("Number", "FT001A"), ("Disp", "3.0")]))
            .unwrap();
        assert_eq!(out, "only FT001A");
    }

    #[test]
    fn invalid_placeholder_reports_position() {
        match Template::parse("ok\n  cost: $5") {
            Err(Error::InvalidPlaceholder { line, column }) => {
                assert_eq!((line, column), (2, 9));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(Template::parse("trailing $").is_err());
        assert!(Template::parse("${}").is_err());
        assert!(Template::parse("${unclosed").is_err());
        assert!(Template::parse("${1abc}").is_err());
    }

    #[test]
    fn check_supplied_rejects_unknown_names() {
        let tmpl = Template::parse("$Macro $Output $Queue").unwrap();
        match tmpl.check_supplied::<ScriptParams>("script") {
            Err(Error::UnsupportedPlaceholder { template, name }) => {
                assert_eq!(template, "script");
                assert_eq!(name, "Queue");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let tmpl = Template::parse("$Disp $Number").unwrap();
        assert!(tmpl.check_supplied::<MacroParams>("macro").is_ok());
    }

    #[test]
    fn macro_params_format_values() {
        let params = MacroParams {
            disp: 0.0,
            number: "FT033A".to_string(),
            events: 500,
        };
        let map = params.bindings();
        assert_eq!(map["Disp"], "0.0");
        assert_eq!(map["Number"], "FT033A");
        assert_eq!(map["Events"], "500");

        let params = MacroParams {
            disp: 1.7,
            ..params
        };
        assert_eq!(params.bindings()["Disp"], "1.7");
    }

    #[test]
    fn load_missing_file_is_template_load_error() {
        let dir = tempfile::tempdir().unwrap();
        match Template::from_path(dir.path().join("AV_loc.mac")) {
            Err(Error::TemplateLoad { path, .. }) => {
                assert!(path.ends_with("AV_loc.mac"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
