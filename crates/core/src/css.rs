//! `@font-face` stylesheet generation.
//!
//! Output is byte-for-byte reproducible: rules follow configuration order
//! (weights lightest first, slices by index) and every rule lists its
//! descriptors in the same order.

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use crate::{
    config::{BuildConfig, FULL_DIR, FontFamily, SUBSET_DIR, Weight, format_hint},
    minify::minify_css,
    plan::FamilyPlan,
    registry::Registry,
};

/// One `@font-face` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFaceRule<'a> {
    pub font_family: &'a str,
    pub font_weight: u16,
    /// URL relative to the `css/` directory.
    pub url: String,
    pub format: &'static str,
    pub unicode_range: Option<&'a str>,
}

impl Display for FontFaceRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@font-face {{")?;
        writeln!(f, "  font-family: '{}';", self.font_family)?;
        writeln!(f, "  font-style: normal;")?;
        writeln!(f, "  font-weight: {};", self.font_weight)?;
        writeln!(f, "  font-display: swap;")?;
        writeln!(f, "  src: url('{}') format('{}');", self.url, self.format)?;
        if let Some(range) = self.unicode_range {
            writeln!(f, "  unicode-range: {range};")?;
        }
        writeln!(f, "}}")
    }
}

/// Joins rules with a blank line between them.
pub fn render_rules<'a>(rules: impl IntoIterator<Item = FontFaceRule<'a>>) -> String {
    rules.into_iter().map(|rule| rule.to_string()).collect::<Vec<_>>().join("\n")
}

/// One rule per weight, each pointing at the whole font.
///
/// Only families with a static script range get a `unicode-range` descriptor.
pub fn full_css(config: &BuildConfig, family: &FontFamily) -> String {
    let format = config.full_format_hint();
    render_rules(config.weights.iter().map(|weight| FontFaceRule {
        font_family: family.display_name,
        font_weight: weight.value,
        url: format!("../{FULL_DIR}/{}", config.font_file_name(family, weight)),
        format,
        unicode_range: family.unicode_range,
    }))
}

/// One rule per registered slice.
///
/// Latin-style families share one partition across weights, so their rules walk
/// the family's slices and keep the ones registered for each weight. CJK families
/// take each weight's registry list as is.
pub fn dynamic_subset_css(config: &BuildConfig, plan: &FamilyPlan, registry: &Registry) -> String {
    let family = &plan.family;
    let mut rules = Vec::new();

    for weight in &config.weights {
        if family.unicode_range.is_none() {
            rules.extend(
                plan.slices
                    .iter()
                    .filter(|slice| registry.contains(family.slug, weight.name, slice.index))
                    .map(|slice| subset_rule(family, weight, slice.index, &slice.unicode_range)),
            );
        } else {
            rules.extend(
                registry
                    .entries(family.slug, weight.name)
                    .iter()
                    .map(|entry| subset_rule(family, weight, entry.slice, &entry.unicode_range)),
            );
        }
    }

    render_rules(rules)
}

fn subset_rule<'a>(
    family: &'a FontFamily,
    weight: &Weight,
    index: usize,
    unicode_range: &'a str,
) -> FontFaceRule<'a> {
    FontFaceRule {
        font_family: family.display_name,
        font_weight: weight.value,
        url: format!("../{SUBSET_DIR}/{}", BuildConfig::subset_file_name(family, weight, index)),
        format: format_hint("woff2"),
        unicode_range: Some(unicode_range),
    }
}

/// The four stylesheets written for one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyStylesheets {
    pub full: String,
    pub full_min: String,
    pub dynamic_subset: String,
    pub dynamic_subset_min: String,
}

impl FamilyStylesheets {
    pub fn generate(config: &BuildConfig, plan: &FamilyPlan, registry: &Registry) -> Self {
        let full = full_css(config, &plan.family);
        let dynamic_subset = dynamic_subset_css(config, plan, registry);
        Self {
            full_min: minify_css(&full),
            dynamic_subset_min: minify_css(&dynamic_subset),
            full,
            dynamic_subset,
        }
    }

    /// Destination path and content of each file, in a fixed order.
    pub fn files(&self, config: &BuildConfig, family: &FontFamily) -> [(PathBuf, &str); 4] {
        let dir = config.css_dir();
        let slug = family.slug;
        [
            (dir.join(format!("{slug}.css")), self.full.as_str()),
            (dir.join(format!("{slug}.min.css")), self.full_min.as_str()),
            (dir.join(format!("{slug}-dynamic-subset.css")), self.dynamic_subset.as_str()),
            (dir.join(format!("{slug}-dynamic-subset.min.css")), self.dynamic_subset_min.as_str()),
        ]
    }
}
