//! Minimal CSS minifier for the generated stylesheets.

use std::sync::OnceLock;

use regex::Regex;

/// Rewrite passes, applied in order. Comments become a space so that removing
/// one never splices its neighbours into a new comment.
static PASSES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn passes() -> &'static [(Regex, &'static str)] {
    PASSES.get_or_init(|| {
        [
            (r"(?s)/\*.*?\*/", " "),
            (r"\s+", " "),
            (r"\s*\{\s*", "{"),
            (r"\s*\}\s*", "}\n"),
            (r"\s*:\s*", ":"),
            (r"\s*;\s*", ";"),
            (r"(?:;\s*)+\}", "}"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (Regex::new(pattern).expect("minifier patterns are valid"), replacement)
        })
        .collect()
    })
}

/// Strips comments and insignificant whitespace, one rule per line.
///
/// Idempotent: `minify_css(&minify_css(s)) == minify_css(s)`.
pub fn minify_css(css: &str) -> String {
    let mut out = css.to_string();
    for (pattern, replacement) in passes() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = "/* generated */\n\
                         @font-face {\n  font-family: 'A B';\n  font-weight: 400;\n}\n\n\
                         @font-face {\n  font-family: 'A B';\n  font-weight: 700;\n}\n";

    #[test]
    fn test_minify_rules() {
        assert_eq!(
            minify_css(RULES),
            "@font-face{font-family:'A B';font-weight:400}\n\
             @font-face{font-family:'A B';font-weight:700}"
        );
    }

    #[test]
    fn test_idempotent() {
        for css in [
            RULES,
            "a { b : c ; ; }   /* x\n y */ d{e:f;}\n\n",
            "a{b:c}//**/*c*/",
            "/*/**/*/x{y:z}",
        ] {
            let once = minify_css(css);
            assert_eq!(minify_css(&once), once, "{css:?}");
        }
    }

    #[test]
    fn test_removed_comment_cannot_open_another() {
        assert_eq!(minify_css("a{b:c}//**/*c*/"), "a{b:c}\n/ *c*/");
        assert_eq!(minify_css("p{font-weight:/**/400}"), "p{font-weight:400}");
    }

    #[test]
    fn test_multiline_comment_and_empty_input() {
        assert_eq!(minify_css("/* one\ntwo */"), "");
        assert_eq!(minify_css(""), "");
    }

    #[test]
    fn test_keeps_space_inside_values() {
        assert_eq!(
            minify_css("p {\n  src: url('a.woff2') format('woff2');\n}"),
            "p{src:url('a.woff2') format('woff2')}"
        );
    }
}
