use {anyhow::Context, pocharvest_config::ScanConfig, regex::Regex};

/// Structural check for plugin modules.
///
/// A file matches when some `class <Name>(<base>):` has a
/// `def <verify>(self ...` line inside its own body. The body is every
/// following logical line indented deeper than the `class` keyword. Blank
/// and comment-only lines do not close it, and neither does a continuation
/// line (inside a triple-quoted string or open brackets, or after a
/// trailing backslash). A verify method that belongs to an unrelated class
/// later in the file does not count.
#[derive(Debug, Clone)]
pub struct PluginMatcher {
    header: Regex,
    verify: Regex,
}

impl PluginMatcher {
    pub fn new(base_class: &str, verify_method: &str) -> anyhow::Result<Self> {
        let header = Regex::new(&format!(
            r"(?m)^([ \t]*)class[ \t]+\w+[ \t]*\([ \t]*{}[ \t]*\)[ \t]*:",
            regex::escape(base_class)
        ))
        .context("invalid plugin base class pattern")?;
        let verify = Regex::new(&format!(
            r"^[ \t]*(?:async[ \t]+)?def[ \t]+{}[ \t]*\([ \t]*self\b",
            regex::escape(verify_method)
        ))
        .context("invalid verify method pattern")?;
        Ok(Self { header, verify })
    }

    pub fn from_config(cfg: &ScanConfig) -> anyhow::Result<Self> {
        Self::new(&cfg.base_class, &cfg.verify_method)
    }

    pub fn is_match(&self, content: &str) -> bool {
        self.header.captures_iter(content).any(|caps| {
            let (Some(whole), Some(indent)) = (caps.get(0), caps.get(1)) else {
                return false;
            };
            let rest = &content[whole.end()..];
            let body = rest.find('\n').map_or("", |i| &rest[i + 1..]);
            self.body_has_verify(body, indent.as_str().len())
        })
    }

    fn body_has_verify(&self, body: &str, class_indent: usize) -> bool {
        let mut state = Continuation::default();
        for line in body.lines() {
            let continued = state.is_open();
            state.feed(line);
            if continued {
                continue;
            }

            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if line.len() - trimmed.len() <= class_indent {
                return false;
            }
            if self.verify.is_match(line) {
                return true;
            }
        }
        false
    }
}

/// Lexical state carried from one physical line to the next.
#[derive(Debug, Default)]
struct Continuation {
    /// Quote byte of an unterminated triple-quoted string.
    triple: Option<u8>,
    depth: usize,
    backslash: bool,
}

impl Continuation {
    /// Whether the next line continues the current logical line.
    fn is_open(&self) -> bool {
        self.triple.is_some() || self.depth > 0 || self.backslash
    }

    fn feed(&mut self, line: &str) {
        // Delimiters are all ASCII, so a byte walk never splits a character.
        let bytes = line.as_bytes();
        let mut i = 0;
        let mut comment = false;
        while i < bytes.len() {
            if let Some(q) = self.triple {
                match bytes[i] {
                    b'\\' => i += 2,
                    b if b == q && bytes[i..].starts_with(&[q, q, q]) => {
                        self.triple = None;
                        i += 3;
                    },
                    _ => i += 1,
                }
                continue;
            }
            match bytes[i] {
                b'#' => {
                    comment = true;
                    break;
                },
                q @ (b'\'' | b'"') if bytes[i..].starts_with(&[q, q, q]) => {
                    self.triple = Some(q);
                    i += 3;
                },
                q @ (b'\'' | b'"') => i = skip_string(bytes, i + 1, q),
                b'(' | b'[' | b'{' => {
                    self.depth += 1;
                    i += 1;
                },
                b')' | b']' | b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    i += 1;
                },
                _ => i += 1,
            }
        }
        self.backslash = !comment && self.triple.is_none() && line.trim_end().ends_with('\\');
    }
}

/// Index just past the closing `quote` of a single-line string whose body
/// starts at `i`, or the line length if it is unterminated.
fn skip_string(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    fn matcher() -> PluginMatcher {
        PluginMatcher::from_config(&ScanConfig::default()).unwrap()
    }

    #[rstest]
    #[case::minimal("class ExploitX(POCBase):\n    def _verify(self):\n        pass\n")]
    #[case::with_members(
        "from pocsuite3.api import POCBase, register_poc\n\n\
         class DemoPOC(POCBase):\n    vulID = '0'\n    name = 'demo'\n\n\
         \x20   def _attack(self):\n        return self._verify()\n\n\
         \x20   def _verify(self):\n        result = {}\n        return result\n\n\
         register_poc(DemoPOC)\n"
    )]
    #[case::comment_at_column_zero(
        "class A(POCBase):\n    name = 'a'\n# leftover comment\n    def _verify(self):\n        pass\n"
    )]
    #[case::spaced_header("class A ( POCBase ) :\n\tdef _verify(self, *args):\n\t\tpass\n")]
    #[case::nested_in_function("def make():\n    class A(POCBase):\n        def _verify(self):\n            pass\n")]
    #[case::crlf("class A(POCBase):\r\n    def _verify(self):\r\n        pass\r\n")]
    #[case::second_class_matches(
        "class A(POCBase):\n    pass\n\nclass B(POCBase):\n    def _verify(self):\n        pass\n"
    )]
    #[case::dedented_desc_string(
        "class DemoPOC(POCBase):\n    vulID = '1571'\n    desc = '''\n\
         Discuz 7.x ... RCE\n    '''\n\n    def _verify(self):\n        return {}\n"
    )]
    #[case::dedented_docstring(
        "class A(POCBase):\n    \"\"\"\nDemo plugin.\n\"\"\"\n    def _verify(self):\n        pass\n"
    )]
    #[case::bracket_continuation(
        "class A(POCBase):\n    samples = [\n'http://a',\n]\n    def _verify(self):\n        pass\n"
    )]
    #[case::bracket_inside_string(
        "class A(POCBase):\n    name = 'open ( paren'\n    def _verify(self):\n        pass\n"
    )]
    #[case::backslash_continuation(
        "class A(POCBase):\n    total = 1 + \\\n2\n    def _verify(self):\n        pass\n"
    )]
    fn matches_plugin_modules(#[case] content: &str) {
        assert!(matcher().is_match(content));
    }

    #[rstest]
    #[case::class_only("class ExploitX(POCBase):\n")]
    #[case::verify_only("def _verify(self):\n    pass\n")]
    #[case::other_base("class A(Base):\n    def _verify(self):\n        pass\n")]
    #[case::other_method("class A(POCBase):\n    def _attack(self):\n        pass\n")]
    #[case::verify_in_unrelated_class(
        "class A(POCBase):\n    def _attack(self):\n        pass\n\n\
         class Helper(object):\n    def _verify(self):\n        pass\n"
    )]
    #[case::verify_at_module_level("class A(POCBase):\n    pass\n\ndef _verify(self):\n    pass\n")]
    #[case::similar_method_name("class A(POCBase):\n    def _verify_target(self):\n        pass\n")]
    #[case::verify_inside_docstring(
        "class A(POCBase):\n    '''\n    def _verify(self):\n    '''\n    pass\n"
    )]
    #[case::dedent_after_closed_string(
        "class A(POCBase):\n    desc = '''\ntext\n'''\n\ndef _verify(self):\n    pass\n"
    )]
    #[case::empty("")]
    fn rejects_non_plugins(#[case] content: &str) {
        assert!(!matcher().is_match(content));
    }

    #[test]
    fn test_custom_names_are_escaped() {
        let m = PluginMatcher::new("Base.Plugin", "check").unwrap();
        assert!(m.is_match("class P(Base.Plugin):\n    def check(self):\n        pass\n"));
        assert!(!m.is_match("class P(BaseXPlugin):\n    def check(self):\n        pass\n"));
    }
}
