//! Request and response types for the Oracle Forge API.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[cfg(test)]
mod tests;

// ============================================================================
// Payload plumbing
// ============================================================================

/// Raw bytes returned by a file-serving route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    /// Content type reported by the server.
    pub content_type: Option<String>,
    /// Body bytes, unchanged.
    pub bytes: Vec<u8>,
}

impl Blob {
    /// Creates a blob.
    #[must_use]
    pub fn new(content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type,
            bytes,
        }
    }

    /// Number of bytes in the blob.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the blob holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A file sent as the single `file` part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the part, if known.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FilePayload {
    /// Creates a payload from in-memory bytes.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Sets the MIME type of the part.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Reads a file from disk, guessing the MIME type of common map formats
    /// from its extension.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or has no file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidRequest(format!("no file name in {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        let content_type = match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => Some("image/png"),
            Some("jpg") | Some("jpeg") => Some("image/jpeg"),
            Some("map") => Some("application/octet-stream"),
            _ => None,
        };

        Ok(Self {
            file_name,
            content_type: content_type.map(str::to_string),
            bytes,
        })
    }
}

/// URL query parameters.
///
/// Empty values are dropped when added, so optional filters never reach the
/// wire as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter unless its value renders as an empty string.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.into(), value));
        }
        self
    }

    /// Adds a parameter when present.
    #[must_use]
    pub fn opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Builds a query from any serializable map-like value.
    ///
    /// Null and empty-string fields are omitted; arrays repeat the key.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRequest`] if the value is not an object or a
    /// field holds a nested object.
    pub fn from_serialize<S: Serialize + ?Sized>(value: &S) -> Result<Self, Error> {
        let value = serde_json::to_value(value)
            .map_err(|err| Error::InvalidRequest(format!("query serialization failed: {err}")))?;
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(Error::InvalidRequest(format!(
                    "query must be an object, got {other}"
                )));
            }
        };

        let mut query = Self::new();
        for (key, value) in map {
            match value {
                Value::Array(items) => {
                    for item in items {
                        query = query.scalar(&key, item)?;
                    }
                }
                other => query = query.scalar(&key, other)?,
            }
        }
        Ok(query)
    }

    fn scalar(self, key: &str, value: Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(self),
            Value::String(text) => Ok(self.param(key, text)),
            Value::Bool(flag) => Ok(self.param(key, flag)),
            Value::Number(number) => Ok(self.param(key, number)),
            Value::Array(_) | Value::Object(_) => Err(Error::InvalidRequest(format!(
                "query parameter {key} must be a scalar"
            ))),
        }
    }

    /// Returns true if no parameters survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the parameter pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns the URL-encoded query string without the leading `?`.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_urlencoded::to_string(&self.pairs).unwrap_or_default()
    }
}

/// Removes null and empty-string fields from JSON objects, recursively.
/// Array elements are kept so positions stay meaningful.
#[must_use]
pub fn prune_empty(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !is_blank(v))
                .map(|(k, v)| (k, prune_empty(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_empty).collect()),
        other => other,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

// ============================================================================
// Shared request shapes
// ============================================================================

/// Wrapper for create/update bodies: `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct EntityRequest<'a, T: ?Sized> {
    /// Entity fields.
    pub data: &'a T,
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Paging and filtering parameters for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// Page number, 1-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Free-text search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

// ============================================================================
// Adventures & World
// ============================================================================

/// Response of `GET /adventures/active`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAdventure {
    /// Name of the active adventure, if one is selected.
    #[serde(default)]
    pub active: Option<String>,
}

/// Kinds of world entity attached to an adventure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Non-player characters.
    Npcs,
    /// Factions.
    Factions,
    /// Locations.
    Locations,
    /// Story lines.
    StoryLines,
}

impl EntityType {
    /// All entity types, in display order.
    pub const ALL: [EntityType; 4] = [
        EntityType::Npcs,
        EntityType::Factions,
        EntityType::Locations,
        EntityType::StoryLines,
    ];

    /// Route segment for this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Npcs => "npcs",
            Self::Factions => "factions",
            Self::Locations => "locations",
            Self::StoryLines => "story_lines",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "npcs" | "npc" => Ok(Self::Npcs),
            "factions" | "faction" => Ok(Self::Factions),
            "locations" | "location" => Ok(Self::Locations),
            "story_lines" | "story_line" | "storylines" => Ok(Self::StoryLines),
            other => Err(format!("unknown world entity type: {other}")),
        }
    }
}

/// Body of `POST /adventures/{id}/world/{type}/{name}`.
#[derive(Debug, Serialize)]
pub struct WorldEntityRequest<'a, T: ?Sized> {
    /// Entity fields.
    pub entity_data: &'a T,
}

// ============================================================================
// Session
// ============================================================================

/// A session journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry text.
    pub content: String,
    /// Entry category (oracle, note, combat...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl LogEntry {
    /// Creates an untyped entry.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            entry_type: None,
            timestamp: None,
        }
    }
}

/// Body of `PUT /session/character/{name}`.
#[derive(Debug, Serialize)]
pub struct CharacterUpdate<'a, T: ?Sized> {
    /// Character sheet fields.
    pub character: &'a T,
}

// ============================================================================
// Lookups
// ============================================================================

/// Reference-data collections available per game system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    /// Equipment and treasure.
    Items,
    /// Monsters.
    Monsters,
    /// Spells.
    Spells,
    /// Rules text.
    Rules,
}

impl LookupKind {
    /// Route segment for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Monsters => "monsters",
            Self::Spells => "spells",
            Self::Rules => "rules",
        }
    }

    /// Route segment of the search endpoints (`/lookup/monster`, ...).
    #[must_use]
    pub fn search_segment(self) -> &'static str {
        match self {
            Self::Items => "item",
            Self::Monsters => "monster",
            Self::Spells => "spell",
            Self::Rules => "rule",
        }
    }

    /// True if the backend can draw random entries of this kind.
    #[must_use]
    pub fn has_random(self) -> bool {
        !matches!(self, Self::Rules)
    }
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LookupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "items" | "item" => Ok(Self::Items),
            "monsters" | "monster" => Ok(Self::Monsters),
            "spells" | "spell" => Ok(Self::Spells),
            "rules" | "rule" => Ok(Self::Rules),
            other => Err(format!("unknown lookup kind: {other}")),
        }
    }
}

/// Body of `POST /lookup/{kind}`.
///
/// Only `query` is required; the filters a kind does not understand are
/// ignored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupSearchRequest {
    /// Name or text to search for.
    pub query: String,
    /// Game system, e.g. `dnd5e`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Tag filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Item category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Item subcategory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Monster or item environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Item quality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Theme hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Narrative context for narration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Extra random matches to draw (0..=50).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random: Option<u32>,
    /// Ask the backend to narrate the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrate: Option<bool>,
}

impl LookupSearchRequest {
    /// Creates a search with no filters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Body of `POST /lookup/{kind}/random`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupRandomRequest {
    /// Number of entries to draw (1..=20).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Game system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Item category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Monster or item environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Item quality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Theme hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Narrative context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Ask the backend to narrate the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrate: Option<bool>,
}

// ============================================================================
// Oracle
// ============================================================================

/// Odds for a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Odds {
    /// Even odds.
    #[serde(rename = "50/50")]
    Even,
    /// Likely.
    #[serde(rename = "likely")]
    Likely,
    /// Unlikely.
    #[serde(rename = "unlikely")]
    Unlikely,
}

impl std::fmt::Display for Odds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Even => write!(f, "50/50"),
            Self::Likely => write!(f, "likely"),
            Self::Unlikely => write!(f, "unlikely"),
        }
    }
}

impl std::str::FromStr for Odds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "50/50" | "even" => Ok(Self::Even),
            "likely" => Ok(Self::Likely),
            "unlikely" => Ok(Self::Unlikely),
            other => Err(format!("unknown odds: {other}")),
        }
    }
}

/// Lowest chaos factor accepted by the oracle.
pub const MIN_CHAOS: u8 = 1;
/// Highest chaos factor accepted by the oracle.
pub const MAX_CHAOS: u8 = 9;

/// Body of `POST /oracle/yesno`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YesNoRequest {
    /// The question asked.
    pub question: String,
    /// Odds of a yes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds: Option<Odds>,
    /// Chaos factor, 1 to 9.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chaos: Option<u8>,
}

impl YesNoRequest {
    /// Creates a question with backend-default odds and chaos.
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            odds: None,
            chaos: None,
        }
    }
}

/// Body of `POST /oracle/yesno/flavor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YesNoFlavorRequest {
    /// The question asked.
    pub question: String,
    /// The oracle's answer.
    pub result: String,
    /// Random event text, if one triggered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_trigger: Option<String>,
}

/// Body of `POST /oracle/scene`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneCheckRequest {
    /// Chaos factor, 1 to 9.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chaos: Option<u8>,
    /// Whether the backend should narrate the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<bool>,
}

/// Body of `POST /oracle/scene/flavor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneFlavorRequest {
    /// Scene focus.
    pub focus: String,
    /// What the players expected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expectation: Option<String>,
}

/// Body of `POST /oracle/meaning`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeaningRequest {
    /// The question asked.
    pub question: String,
    /// Meaning table to roll on.
    pub table: String,
}

/// Body of `POST /oracle/meaning/flavor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeaningFlavorRequest {
    /// The question asked.
    pub question: String,
    /// Keywords rolled from the meaning tables.
    pub keywords: Vec<String>,
}

// ============================================================================
// Generators
// ============================================================================

/// Body of `POST /generators/roll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorRollRequest {
    /// Generator category.
    pub category: String,
    /// Generator file within the category.
    pub file: String,
    /// Table identifier within the file.
    pub table_id: String,
}

/// Body of `POST /generators/flavor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorFlavorRequest {
    /// Narrative context.
    pub context: String,
    /// Generated result to narrate.
    pub data: Value,
    /// Generator category.
    pub category: String,
    /// Generator that produced the result.
    pub source: String,
}

/// Body of `POST /generators/custom/{category}/{system}/{id}`.
#[derive(Debug, Serialize)]
pub struct GeneratorParameters<'a, T: ?Sized> {
    /// Generator inputs.
    pub parameters: &'a T,
}

// ============================================================================
// Combat
// ============================================================================

/// Body of `POST /combat/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatStartRequest {
    /// Monster names joining the encounter.
    pub monsters: Vec<String>,
}

/// Body of `POST /combat/attack`: two combatant records as found in the
/// combat state.
#[derive(Debug, Serialize)]
pub struct AttackRequest<'a, T: ?Sized> {
    /// Attacking combatant.
    pub attacker: &'a T,
    /// Defending combatant.
    pub defender: &'a T,
}
