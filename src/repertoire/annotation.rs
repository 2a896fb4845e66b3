use regex::Regex;
use std::sync::LazyLock;

// `[%name value]` commands embedded in comments by lichess and ChessBase.
static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%([A-Za-z][A-Za-z0-9_]*)\s*([^\]]*)\]").expect("valid comment command regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCommand {
    pub name: String,
    pub value: String,
}

/// A comment split into readable text and embedded commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub text: String,
    pub commands: Vec<CommentCommand>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.commands.is_empty()
    }

    pub fn command(&self, name: &str) -> Option<&str> {
        self.commands
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Highlighted squares and arrows (`%csl` / `%cal`), e.g. `Gd4`, `Re2e4`.
    pub fn shapes(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.name == "csl" || c.name == "cal")
            .flat_map(|c| c.value.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

pub fn parse_comment(raw: &str) -> Annotation {
    let commands = COMMAND_RE
        .captures_iter(raw)
        .map(|caps| CommentCommand {
            name: caps[1].to_string(),
            value: caps[2].trim().to_string(),
        })
        .collect();

    let stripped = COMMAND_RE.replace_all(raw, " ");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    Annotation { text, commands }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_comment_passes_through() {
        let annotation = parse_comment("  the main   idea ");
        assert_eq!(annotation.text, "the main idea");
        assert!(annotation.commands.is_empty());
    }

    #[test]
    fn test_commands_are_extracted() {
        let annotation = parse_comment("[%eval 0.25] [%clk 1:30:43] solid");
        assert_eq!(annotation.text, "solid");
        assert_eq!(annotation.command("eval"), Some("0.25"));
        assert_eq!(annotation.command("clk"), Some("1:30:43"));
        assert_eq!(annotation.command("emt"), None);
    }

    #[test]
    fn test_shapes_from_csl_and_cal() {
        let annotation = parse_comment("Aim at d5 [%csl Gd5,Rf7][%cal Gc4f7]");
        assert_eq!(annotation.text, "Aim at d5");
        assert_eq!(annotation.shapes(), vec!["Gd5", "Rf7", "Gc4f7"]);
    }

    #[test]
    fn test_command_only_comment_has_empty_text() {
        let annotation = parse_comment("[%cal Ge2e4]");
        assert!(annotation.text.is_empty());
        assert!(!annotation.is_empty());
    }

    #[test]
    fn test_unterminated_bracket_is_kept_as_text() {
        let annotation = parse_comment("see [%eval 0.3");
        assert_eq!(annotation.text, "see [%eval 0.3");
        assert!(annotation.commands.is_empty());
    }
}
