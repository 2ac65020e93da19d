//! Work search filters and their mapping to the archive's `work_search[...]` query keys.

use std::fmt;
use std::str::FromStr;

/// Content rating filter. Ids are the archive's rating tag ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    NotRated,
    GeneralAudiences,
    TeenAndUp,
    Mature,
    Explicit,
}

impl Rating {
    pub fn id(self) -> u32 {
        match self {
            Rating::NotRated => 9,
            Rating::GeneralAudiences => 10,
            Rating::TeenAndUp => 11,
            Rating::Mature => 12,
            Rating::Explicit => 13,
        }
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match key(s).as_str() {
            "notrated" => Ok(Rating::NotRated),
            "general" | "generalaudiences" => Ok(Rating::GeneralAudiences),
            "teen" | "teenandup" | "teenandupaudiences" => Ok(Rating::TeenAndUp),
            "mature" => Ok(Rating::Mature),
            "explicit" => Ok(Rating::Explicit),
            _ => Err(format!(
                "unknown rating '{}'; use not-rated, general, teen, mature or explicit",
                s
            )),
        }
    }
}

/// Archive warning filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    CreatorChoseNotToUse,
    NoneApply,
    GraphicViolence,
    MajorCharacterDeath,
    RapeNonCon,
    Underage,
}

impl Warning {
    pub fn id(self) -> u32 {
        match self {
            Warning::CreatorChoseNotToUse => 14,
            Warning::NoneApply => 16,
            Warning::GraphicViolence => 17,
            Warning::MajorCharacterDeath => 18,
            Warning::RapeNonCon => 19,
            Warning::Underage => 20,
        }
    }
}

impl FromStr for Warning {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match key(s).as_str() {
            "choosenottouse" | "creatorchosenottousearchivewarnings" => {
                Ok(Warning::CreatorChoseNotToUse)
            }
            "none" | "noarchivewarningsapply" => Ok(Warning::NoneApply),
            "violence" | "graphicdepictionsofviolence" => Ok(Warning::GraphicViolence),
            "death" | "majorcharacterdeath" => Ok(Warning::MajorCharacterDeath),
            "noncon" | "rapenoncon" => Ok(Warning::RapeNonCon),
            "underage" => Ok(Warning::Underage),
            _ => Err(format!(
                "unknown warning '{}'; use choose-not-to-use, none, violence, death, noncon or underage",
                s
            )),
        }
    }
}

/// Relationship category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    FemaleFemale,
    FemaleMale,
    Gen,
    MaleMale,
    Multi,
    Other,
    NonBinary,
}

impl Category {
    pub fn id(self) -> u32 {
        match self {
            Category::FemaleFemale => 116,
            Category::FemaleMale => 22,
            Category::Gen => 21,
            Category::MaleMale => 23,
            Category::Multi => 2246,
            Category::Other => 24,
            Category::NonBinary => 25,
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match key(s).as_str() {
            "ff" => Ok(Category::FemaleFemale),
            "fm" => Ok(Category::FemaleMale),
            "gen" => Ok(Category::Gen),
            "mm" => Ok(Category::MaleMale),
            "multi" => Ok(Category::Multi),
            "other" => Ok(Category::Other),
            "nonbinary" => Ok(Category::NonBinary),
            _ => Err(format!(
                "unknown category '{}'; use f/f, f/m, gen, m/m, multi, other or non-binary",
                s
            )),
        }
    }
}

/// Result ordering. Default is best match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    BestMatch,
    Author,
    Title,
    DatePosted,
    DateUpdated,
    WordCount,
    Hits,
    Kudos,
    Comments,
    Bookmarks,
}

impl SortColumn {
    /// Column key the archive's search form submits.
    pub fn as_param(self) -> &'static str {
        match self {
            SortColumn::BestMatch => "_score",
            SortColumn::Author => "authors_to_sort_on",
            SortColumn::Title => "title_to_sort_on",
            SortColumn::DatePosted => "created_at",
            SortColumn::DateUpdated => "revised_at",
            SortColumn::WordCount => "word_count",
            SortColumn::Hits => "hits",
            SortColumn::Kudos => "kudos_count",
            SortColumn::Comments => "comments_count",
            SortColumn::Bookmarks => "bookmarks_count",
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match key(s).as_str() {
            "bestmatch" | "score" => Ok(SortColumn::BestMatch),
            "author" => Ok(SortColumn::Author),
            "title" => Ok(SortColumn::Title),
            "posted" | "dateposted" => Ok(SortColumn::DatePosted),
            "updated" | "dateupdated" => Ok(SortColumn::DateUpdated),
            "words" | "wordcount" => Ok(SortColumn::WordCount),
            "hits" => Ok(SortColumn::Hits),
            "kudos" => Ok(SortColumn::Kudos),
            "comments" => Ok(SortColumn::Comments),
            "bookmarks" => Ok(SortColumn::Bookmarks),
            _ => Err(format!("unknown sort column '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match key(s).as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("unknown sort direction '{}'; use asc or desc", s)),
        }
    }
}

/// Lowercased ASCII letters only: "Teen And Up" and "teen-and-up" both become "teenandup".
fn key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Filters for a work search. Unset and empty fields are not sent. Range fields (`word_count`,
/// `hits`, ...) take the archive's own syntax, e.g. `">1000"` or `"100-500"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub query: Option<String>,
    pub title: Option<String>,
    pub creators: Option<String>,
    pub revised_at: Option<String>,
    pub complete: Option<bool>,
    pub single_chapter: bool,
    pub word_count: Option<String>,
    pub language: Option<String>,
    pub fandoms: Vec<String>,
    pub ratings: Vec<Rating>,
    pub warnings: Vec<Warning>,
    pub categories: Vec<Category>,
    pub characters: Vec<String>,
    pub relationships: Vec<String>,
    pub freeforms: Vec<String>,
    pub hits: Option<String>,
    pub kudos: Option<String>,
    pub comments: Option<String>,
    pub bookmarks: Option<String>,
    pub sort_column: Option<SortColumn>,
    pub sort_direction: Option<SortDirection>,
    pub page: Option<u32>,
}

impl SearchOptions {
    /// Query pairs in the order the archive's search form submits them. Sort column and
    /// direction are always present.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = vec![("commit", "Search".to_string())];
        let mut single = |name: &'static str, value: &Option<String>| {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((name, v.to_string()));
            }
        };
        single("work_search[query]", &self.query);
        single("work_search[title]", &self.title);
        single("work_search[creators]", &self.creators);
        single("work_search[revised_at]", &self.revised_at);
        let complete = self.complete.map(|c| if c { "T" } else { "F" }.to_string());
        single("work_search[complete]", &complete);
        let single_chapter = self.single_chapter.then(|| "1".to_string());
        single("work_search[single_chapter]", &single_chapter);
        single("work_search[word_count]", &self.word_count);
        single("work_search[language_id]", &self.language);
        single("work_search[hits]", &self.hits);
        single("work_search[kudos_count]", &self.kudos);
        single("work_search[comments_count]", &self.comments);
        single("work_search[bookmarks_count]", &self.bookmarks);

        let repeated = [
            ("work_search[fandom_names]", &self.fandoms),
            ("work_search[character_names]", &self.characters),
            ("work_search[relationship_names]", &self.relationships),
            ("work_search[freeform_names]", &self.freeforms),
        ];
        for (name, values) in repeated {
            pairs.extend(
                values
                    .iter()
                    .filter(|v| !v.is_empty())
                    .map(|v| (name, v.clone())),
            );
        }
        pairs.extend(
            self.ratings
                .iter()
                .map(|r| ("work_search[rating_ids][]", r.id().to_string())),
        );
        pairs.extend(
            self.warnings
                .iter()
                .map(|w| ("work_search[archive_warning_ids][]", w.id().to_string())),
        );
        pairs.extend(
            self.categories
                .iter()
                .map(|c| ("work_search[category_ids][]", c.id().to_string())),
        );

        pairs.push((
            "work_search[sort_column]",
            self.sort_column.unwrap_or_default().as_param().to_string(),
        ));
        pairs.push((
            "work_search[sort_direction]",
            self.sort_direction.unwrap_or_default().to_string(),
        ));
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

/// Escape a tag name the way the archive does in `/tags/{name}/works` paths. The result still
/// needs path-segment percent-encoding.
pub fn escape_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    for c in tag.chars() {
        match c {
            '/' => out.push_str("*s*"),
            '&' => out.push_str("*a*"),
            '.' => out.push_str("*d*"),
            '?' => out.push_str("*q*"),
            '#' => out.push_str("*h*"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(pairs: &'a [(&'static str, String)], name: &str) -> Vec<&'a str> {
        pairs
            .iter()
            .filter(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn default_options_send_only_commit_and_sort() {
        let pairs = SearchOptions::default().to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("commit", "Search".to_string()),
                ("work_search[sort_column]", "_score".to_string()),
                ("work_search[sort_direction]", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn filters_map_to_archive_ids() {
        let options = SearchOptions {
            query: Some("coffee shop".to_string()),
            title: Some(String::new()),
            complete: Some(false),
            single_chapter: true,
            fandoms: vec!["Good Omens".to_string(), "Discworld".to_string()],
            ratings: vec![Rating::GeneralAudiences, Rating::Explicit],
            warnings: vec![Warning::NoneApply],
            categories: vec![Category::FemaleFemale, Category::Multi],
            sort_column: Some(SortColumn::Kudos),
            sort_direction: Some(SortDirection::Asc),
            page: Some(3),
            ..Default::default()
        };
        let pairs = options.to_query_pairs();
        assert_eq!(values(&pairs, "work_search[query]"), vec!["coffee shop"]);
        assert!(values(&pairs, "work_search[title]").is_empty());
        assert_eq!(values(&pairs, "work_search[complete]"), vec!["F"]);
        assert_eq!(values(&pairs, "work_search[single_chapter]"), vec!["1"]);
        assert_eq!(
            values(&pairs, "work_search[fandom_names]"),
            vec!["Good Omens", "Discworld"]
        );
        assert_eq!(values(&pairs, "work_search[rating_ids][]"), vec!["10", "13"]);
        assert_eq!(
            values(&pairs, "work_search[archive_warning_ids][]"),
            vec!["16"]
        );
        assert_eq!(
            values(&pairs, "work_search[category_ids][]"),
            vec!["116", "2246"]
        );
        assert_eq!(values(&pairs, "work_search[sort_column]"), vec!["kudos_count"]);
        assert_eq!(values(&pairs, "work_search[sort_direction]"), vec!["asc"]);
        assert_eq!(values(&pairs, "page"), vec!["3"]);
    }

    #[test]
    fn filter_names_parse_loosely() {
        assert_eq!("Teen And Up Audiences".parse::<Rating>(), Ok(Rating::TeenAndUp));
        assert_eq!("teen".parse::<Rating>(), Ok(Rating::TeenAndUp));
        assert_eq!("M/M".parse::<Category>(), Ok(Category::MaleMale));
        assert_eq!("non-binary".parse::<Category>(), Ok(Category::NonBinary));
        assert_eq!("Major Character Death".parse::<Warning>(), Ok(Warning::MajorCharacterDeath));
        assert_eq!("date-updated".parse::<SortColumn>(), Ok(SortColumn::DateUpdated));
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("lukewarm".parse::<Rating>().is_err());
    }

    #[test]
    fn tag_escaping_follows_archive_convention() {
        assert_eq!(escape_tag("Aziraphale/Crowley"), "Aziraphale*s*Crowley");
        assert_eq!(escape_tag("Q&A"), "Q*a*A");
        assert_eq!(escape_tag("Dr. Who?"), "Dr*d* Who*q*");
        assert_eq!(escape_tag("#1 Fan"), "*h*1 Fan");
    }
}
