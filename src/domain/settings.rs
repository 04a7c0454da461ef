//! Site settings
//!
//! Branding, feature toggles, navbar links and the bundle of user-facing UI
//! strings. There are no cross-entity invariants here beyond well-formed
//! strings; the schema validator enforces the non-empty ones.

use serde::{Deserialize, Serialize};

use super::patch::{double_option, merge};

/// Accent palette choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    #[default]
    Indigo,
    Violet,
    Blue,
    Emerald,
    Rose,
    Amber,
}

impl AccentColor {
    pub const ALL: [AccentColor; 6] = [
        AccentColor::Indigo,
        AccentColor::Violet,
        AccentColor::Blue,
        AccentColor::Emerald,
        AccentColor::Rose,
        AccentColor::Amber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccentColor::Indigo => "indigo",
            AccentColor::Violet => "violet",
            AccentColor::Blue => "blue",
            AccentColor::Emerald => "emerald",
            AccentColor::Rose => "rose",
            AccentColor::Amber => "amber",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavbarLink {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocLabels {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLabels {
    pub placeholder: String,
    pub empty: String,
    pub no_results: String,
    pub no_results_hint: String,
    pub trigger_label: String,
    pub shortcut: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationLabels {
    pub previous: String,
    pub next: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackLabels {
    pub question: String,
    pub yes: String,
    pub no: String,
    pub thanks_yes: String,
    pub thanks_no: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleLabels {
    pub copy_link: String,
    pub copied: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarLabels {
    pub search_label: String,
}

/// Every user-facing string of the rendered site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiLabels {
    pub toc: TocLabels,
    pub search: SearchLabels,
    pub pagination: PaginationLabels,
    pub feedback: FeedbackLabels,
    pub article: ArticleLabels,
    pub sidebar: SidebarLabels,
}

impl Default for UiLabels {
    fn default() -> Self {
        Self {
            toc: TocLabels {
                title: "On this page".to_string(),
            },
            search: SearchLabels {
                placeholder: "Search the wiki…".to_string(),
                empty: "Type to search".to_string(),
                no_results: "Nothing found".to_string(),
                no_results_hint: "Try a different query".to_string(),
                trigger_label: "Open search".to_string(),
                shortcut: "⌘K".to_string(),
            },
            pagination: PaginationLabels {
                previous: "Previous".to_string(),
                next: "Next".to_string(),
            },
            feedback: FeedbackLabels {
                question: "Was this page helpful?".to_string(),
                yes: "Yes".to_string(),
                no: "No".to_string(),
                thanks_yes: "Thanks! Glad it helped.".to_string(),
                thanks_no: "Thanks! We'll try to improve it.".to_string(),
            },
            article: ArticleLabels {
                copy_link: "Copy link".to_string(),
                copied: "Copied!".to_string(),
            },
            sidebar: SidebarLabels {
                search_label: "Quick search…".to_string(),
            },
        }
    }
}

/// Site-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub name: String,
    pub description: String,
    pub logo_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    /// Slug opened at the site root
    pub default_slug: String,
    pub accent_color: AccentColor,
    pub navbar_links: Vec<NavbarLink>,
    pub show_theme_toggle: bool,
    pub show_search: bool,
    pub show_github: bool,
    pub ui_labels: UiLabels,
}

impl Settings {
    /// Shallow-merges a patch; `ui_labels` is replaced wholesale when present
    pub fn apply(&mut self, patch: SettingsPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        merge(&mut self.logo_text, patch.logo_text);
        merge(&mut self.version, patch.version);
        merge(&mut self.github_url, patch.github_url);
        merge(&mut self.default_slug, patch.default_slug);
        merge(&mut self.accent_color, patch.accent_color);
        merge(&mut self.navbar_links, patch.navbar_links);
        merge(&mut self.show_theme_toggle, patch.show_theme_toggle);
        merge(&mut self.show_search, patch.show_search);
        merge(&mut self.show_github, patch.show_github);
        merge(&mut self.ui_labels, patch.ui_labels);
    }
}

/// Partial update for [`Settings`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub version: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub github_url: Option<Option<String>>,
    #[serde(default)]
    pub default_slug: Option<String>,
    #[serde(default)]
    pub accent_color: Option<AccentColor>,
    #[serde(default)]
    pub navbar_links: Option<Vec<NavbarLink>>,
    #[serde(default)]
    pub show_theme_toggle: Option<bool>,
    #[serde(default)]
    pub show_search: Option<bool>,
    #[serde(default)]
    pub show_github: Option<bool>,
    #[serde(default)]
    pub ui_labels: Option<UiLabels>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
