use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(rename = "html_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub gid: String,
    pub name: String,
}

/// A workspace, project or repository offered by the listing helper.
#[derive(Debug, Clone)]
pub struct Listed {
    pub id: String,
    pub name: String,
}
