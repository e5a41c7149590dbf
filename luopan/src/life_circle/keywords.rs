//! Keyword heuristics for recognising homes, workplaces and leisure spots
//! from point names.

use super::PointRole;

/// Default substrings suggesting a residence.
pub const DEFAULT_HOME_KEYWORDS: &[&str] = &[
    "家", "小区", "公寓", "住宅", "宿舍", "花园", "苑", "home", "house", "apartment", "residence",
];

/// Default substrings suggesting a workplace.
pub const DEFAULT_WORK_KEYWORDS: &[&str] = &[
    "公司", "大厦", "办公", "写字楼", "科技", "集团", "园区", "学校", "大学", "office", "work",
    "company", "campus",
];

/// Default substrings suggesting a leisure destination.
pub const DEFAULT_LEISURE_KEYWORDS: &[&str] = &[
    "公园", "商场", "广场", "餐厅", "咖啡", "影院", "健身", "酒吧", "书店", "park", "mall", "cafe",
    "gym", "restaurant",
];

/// Per-role keyword scores for one name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleScores {
    scores: [usize; 3],
}

impl RoleScores {
    pub fn new(home: usize, work: usize, leisure: usize) -> Self {
        Self {
            scores: [home, work, leisure],
        }
    }

    pub fn get(&self, role: PointRole) -> usize {
        self.scores[role.index()]
    }

    pub fn total(&self) -> usize {
        self.scores.iter().sum()
    }
}

/// The three keyword sets used to score point names.
///
/// Matching is by substring occurrence; ASCII letters match
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSets {
    home: Vec<String>,
    work: Vec<String>,
    leisure: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOME_KEYWORDS.iter().copied(),
            DEFAULT_WORK_KEYWORDS.iter().copied(),
            DEFAULT_LEISURE_KEYWORDS.iter().copied(),
        )
    }
}

impl KeywordSets {
    /// Build keyword sets. Empty keywords are discarded.
    pub fn new<H, W, L, S>(home: H, work: W, leisure: L) -> Self
    where
        H: IntoIterator<Item = S>,
        W: IntoIterator<Item = S>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            home: clean(home),
            work: clean(work),
            leisure: clean(leisure),
        }
    }

    /// Keywords for one role.
    pub fn keywords(&self, role: PointRole) -> &[String] {
        match role {
            PointRole::Home => &self.home,
            PointRole::Work => &self.work,
            PointRole::Leisure => &self.leisure,
        }
    }

    /// Replace the keywords for one role.
    pub fn set_keywords<I, S>(&mut self, role: PointRole, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned = clean(keywords);
        match role {
            PointRole::Home => self.home = cleaned,
            PointRole::Work => self.work = cleaned,
            PointRole::Leisure => self.leisure = cleaned,
        }
    }

    /// Count keyword occurrences of each set in `name`.
    pub fn score(&self, name: &str) -> RoleScores {
        let name = name.to_lowercase();
        let count = |keywords: &[String]| -> usize {
            keywords.iter().map(|k| name.matches(k.as_str()).count()).sum()
        };
        RoleScores::new(count(&self.home), count(&self.work), count(&self.leisure))
    }
}

fn clean<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
