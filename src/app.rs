//! Command execution over the gateway client and the query cache.

use crate::cache::{QueryCache, QueryResult, Tag};
use crate::cli::{
    AdventureCommand, CombatCommand, Command, GeneratorCommand, JournalCommand, LookupArgs,
    LookupCommand, MapCommand, OracleCommand, PlayerCommand, ShellLine, WorldCommand,
    split_words,
};
use crate::config::Config;
use crate::error::AppError;
use clap::Parser;
use oracle_forge_client::{
    Blob, CancellationToken, CombatStartRequest, Envelope, Error as GatewayError, FilePayload,
    GatewayClient, ListParams, LogEntry, LookupRandomRequest, LookupSearchRequest,
    MeaningRequest, SceneCheckRequest, YesNoRequest,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::future::Future;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

type Fetched = Result<Envelope<Value>, GatewayError>;

/// Front-end application state: one gateway client and one query cache.
///
/// Every command runs under its own child of the shutdown token, so an
/// interrupt cancels the running command and leaves later ones unaffected.
#[derive(Debug)]
pub struct App {
    client: GatewayClient,
    cache: QueryCache,
    shutdown: CancellationToken,
    running: Mutex<Option<CancellationToken>>,
}

impl App {
    /// Builds the application from resolved configuration.
    ///
    /// # Errors
    /// Returns error if the gateway client cannot be built.
    pub fn new(config: &Config, shutdown: CancellationToken) -> Result<Self, AppError> {
        let client = GatewayClient::new(config.client_config())?;
        let cache = if config.cache.enabled {
            QueryCache::new(config.cache.ttl())
        } else {
            QueryCache::disabled()
        };
        info!(base_url = client.base_url(), cache = config.cache.enabled, "oracle forge ready");
        Ok(Self {
            client,
            cache,
            shutdown,
            running: Mutex::new(None),
        })
    }

    /// Builds the application around an existing client and cache.
    #[must_use]
    pub fn with_parts(client: GatewayClient, cache: QueryCache) -> Self {
        Self {
            client,
            cache,
            shutdown: CancellationToken::new(),
            running: Mutex::new(None),
        }
    }

    /// Token that stops the shell and every command when cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Cancels the command in flight, if any. Returns false when idle.
    pub fn interrupt(&self) -> bool {
        match self.running.lock().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// The query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Runs one command and returns the data to display.
    ///
    /// # Errors
    /// Returns the gateway or input error that prevented the command from
    /// producing data.
    pub async fn execute(&self, command: Command) -> Result<Value, AppError> {
        let token = self.shutdown.child_token();
        *self.running.lock() = Some(token.clone());
        let client = self.client.with_cancellation(token);

        let result = self.dispatch(&client, command).await;
        self.running.lock().take();
        result
    }

    async fn dispatch(&self, client: &GatewayClient, command: Command) -> Result<Value, AppError> {
        debug!(?command, "executing command");

        match command {
            Command::Health => {
                self.read(Tag::System, "/health", || client.health_check::<Value>())
                    .await
            }
            Command::Status => {
                self.read(Tag::System, "/config/status", || client.config_status::<Value>())
                    .await
            }
            Command::Adventures(cmd) => self.adventures(client, cmd).await,
            Command::World(cmd) => self.world(client, cmd).await,
            Command::Players(cmd) => self.players(client, cmd).await,
            Command::Journal(cmd) => self.journal(client, cmd).await,
            Command::Lookup(cmd) => self.lookup(client, cmd).await,
            Command::Oracle(cmd) => self.oracle(client, cmd).await,
            Command::Generators(cmd) => self.generators(client, cmd).await,
            Command::Combat(cmd) => self.combat(client, cmd).await,
            Command::Maps(cmd) => self.maps(client, cmd).await,
            Command::Get { path } => {
                let path = if path.starts_with('/') {
                    path
                } else {
                    format!("/{path}")
                };
                self.read(Tag::for_path(&path), &path, || client.get::<Value>(&path, None))
                    .await
            }
            Command::Shell => Err(AppError::InvalidInput(
                "shell cannot be started from inside the shell".to_string(),
            )),
        }
    }

    /// Reads commands line by line from `input` until end of input, `quit`, or
    /// shutdown, writing results to `output`. Errors, cancelled commands
    /// included, are reported inline and do not stop the loop.
    ///
    /// # Errors
    /// Returns error only if reading input or writing output fails.
    pub async fn run_shell<R, W>(&self, input: R, mut output: W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            let next = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                next = lines.next_line() => next?,
            };
            let Some(line) = next else {
                break;
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if matches!(line, "exit" | "quit") {
                break;
            }

            let rendered = match self.shell_line(line).await {
                Ok(data) => render(&data),
                Err(err) => format!("error: {}", err.banner()),
            };
            output.write_all(rendered.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok(())
    }

    async fn shell_line(&self, line: &str) -> Result<Value, AppError> {
        let words = split_words(line)
            .ok_or_else(|| AppError::InvalidInput("unterminated quote".to_string()))?;
        let parsed = ShellLine::try_parse_from(words)
            .map_err(|err| AppError::InvalidInput(err.to_string().trim_end().to_string()))?;
        self.execute(parsed.command).await
    }

    // ========================================================================
    // Adventures
    // ========================================================================

    async fn adventures(&self, client: &GatewayClient, cmd: AdventureCommand) -> Result<Value, AppError> {
        match cmd {
            AdventureCommand::List => {
                self.read(Tag::Adventures, "/adventures/list", || {
                    client.list_adventures::<Value>()
                })
                .await
            }
            AdventureCommand::Show { id } => {
                self.read(Tag::Adventures, &format!("/adventures/{id}"), || {
                    client.get_adventure::<Value>(&id)
                })
                .await
            }
            AdventureCommand::Create { name, data } => {
                let mut fields = match data {
                    Some(data) => parse_object(&data)?,
                    None => json!({}),
                };
                fields["name"] = Value::String(name);
                self.mutate(Tag::Adventures, client.create_adventure::<Value, _>(&fields))
                    .await
            }
            AdventureCommand::Update { id, data } => {
                let fields = parse_object(&data)?;
                self.mutate(Tag::Adventures, client.update_adventure::<Value, _>(&id, &fields))
                    .await
            }
            AdventureCommand::Delete { id } => {
                self.mutate(Tag::Adventures, client.delete_adventure::<Value>(&id))
                    .await
            }
            AdventureCommand::Active => {
                self.read(Tag::Adventures, "/adventures/active", || async {
                    client
                        .active_adventure()
                        .await
                        .map(|env| env.map(|active| json!({ "active": active.active })))
                })
                .await
            }
            AdventureCommand::Select { id } => {
                self.mutate(Tag::Adventures, client.select_adventure::<Value>(&id))
                    .await
            }
            AdventureCommand::Clear => {
                self.mutate(Tag::Adventures, client.clear_active_adventure::<Value>())
                    .await
            }
        }
    }

    // ========================================================================
    // World
    // ========================================================================

    async fn world(&self, client: &GatewayClient, cmd: WorldCommand) -> Result<Value, AppError> {
        match cmd {
            WorldCommand::State { adventure } => {
                let key = format!("/adventures/{adventure}/world_state");
                self.read(Tag::World, &key, || client.world_state::<Value>(&adventure))
                    .await
            }
            WorldCommand::SetState { adventure, data } => {
                let state = parse_object(&data)?;
                self.mutate(Tag::World, client.update_world_state::<Value, _>(&adventure, &state))
                    .await
            }
            WorldCommand::List {
                adventure,
                entity_type,
            } => {
                let key = format!("/adventures/{adventure}/world/{entity_type}");
                self.read(Tag::World, &key, || {
                    client.list_world_entities::<Value>(&adventure, entity_type)
                })
                .await
            }
            WorldCommand::Show {
                adventure,
                entity_type,
                name,
            } => {
                let key = format!("/adventures/{adventure}/world/{entity_type}/{name}");
                self.read(Tag::World, &key, || {
                    client.get_world_entity::<Value>(&adventure, entity_type, &name)
                })
                .await
            }
            WorldCommand::Save {
                adventure,
                entity_type,
                name,
                data,
            } => {
                let fields = parse_object(&data)?;
                self.mutate(
                    Tag::World,
                    client.save_world_entity::<Value, _>(&adventure, entity_type, &name, &fields),
                )
                .await
            }
            WorldCommand::Delete {
                adventure,
                entity_type,
                name,
            } => {
                self.mutate(
                    Tag::World,
                    client.delete_world_entity::<Value>(&adventure, entity_type, &name),
                )
                .await
            }
        }
    }

    // ========================================================================
    // Players
    // ========================================================================

    async fn players(&self, client: &GatewayClient, cmd: PlayerCommand) -> Result<Value, AppError> {
        match cmd {
            PlayerCommand::List { adventure } => {
                let key = format!("/adventures/{adventure}/players");
                self.read(Tag::Players, &key, || client.list_players::<Value>(&adventure))
                    .await
            }
            PlayerCommand::Show {
                adventure,
                filename,
            } => {
                let key = format!("/adventures/{adventure}/players/{filename}");
                self.read(Tag::Players, &key, || {
                    client.get_player::<Value>(&adventure, &filename)
                })
                .await
            }
            PlayerCommand::Create { adventure, data } => {
                let player = parse_object(&data)?;
                self.mutate(Tag::Players, client.create_player::<Value, _>(&adventure, &player))
                    .await
            }
            PlayerCommand::Update {
                adventure,
                filename,
                data,
            } => {
                let player = parse_object(&data)?;
                self.mutate(
                    Tag::Players,
                    client.update_player::<Value, _>(&adventure, &filename, &player),
                )
                .await
            }
            PlayerCommand::Delete {
                adventure,
                filename,
            } => {
                self.mutate(Tag::Players, client.delete_player::<Value>(&adventure, &filename))
                    .await
            }
        }
    }

    // ========================================================================
    // Journal
    // ========================================================================

    async fn journal(&self, client: &GatewayClient, cmd: JournalCommand) -> Result<Value, AppError> {
        match cmd {
            JournalCommand::State => {
                self.read(Tag::Sessions, "/session/state", || client.session_state::<Value>())
                    .await
            }
            JournalCommand::Show => {
                self.read(Tag::Sessions, "/session/log", || client.session_log::<Value>())
                    .await
            }
            JournalCommand::Add {
                content,
                entry_type,
            } => {
                let entry = LogEntry {
                    content,
                    entry_type,
                    timestamp: Some(chrono::Utc::now().to_rfc3339()),
                };
                self.mutate(Tag::Sessions, client.append_session_log::<Value>(&entry))
                    .await
            }
            JournalCommand::End => self.mutate(Tag::Sessions, client.end_session::<Value>()).await,
            JournalCommand::Character { name } => {
                let key = format!("/session/character/{name}");
                self.read(Tag::Sessions, &key, || client.get_character::<Value>(&name))
                    .await
            }
            JournalCommand::Sessions { adventure } => {
                let key = format!("/adventures/{adventure}/sessions");
                self.read(Tag::Sessions, &key, || client.list_sessions::<Value>(&adventure))
                    .await
            }
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    async fn lookup(&self, client: &GatewayClient, cmd: LookupCommand) -> Result<Value, AppError> {
        match cmd {
            LookupCommand::Browse(args) => self.browse(client, args).await,
            LookupCommand::Search {
                kind,
                query,
                system,
                tag,
                category,
                environment,
                random,
                narrate,
            } => {
                let request = LookupSearchRequest {
                    system,
                    tag,
                    category,
                    environment,
                    random,
                    narrate: narrate.then_some(true),
                    ..LookupSearchRequest::new(query)
                };
                unwrap(client.lookup_search::<Value>(kind, &request).await?)
            }
            LookupCommand::Random {
                kind,
                count,
                system,
                category,
                environment,
                narrate,
            } => {
                let request = LookupRandomRequest {
                    count,
                    system,
                    category,
                    environment,
                    narrate: narrate.then_some(true),
                    ..Default::default()
                };
                unwrap(client.lookup_random::<Value>(kind, &request).await?)
            }
            LookupCommand::Categories => {
                self.read(Tag::Lookups, "/lookup/categories", || {
                    client.lookup_categories::<Value>()
                })
                .await
            }
            LookupCommand::Systems => {
                self.read(Tag::Lookups, "/lookup/systems", || client.lookup_systems::<Value>())
                    .await
            }
        }
    }

    async fn browse(&self, client: &GatewayClient, args: LookupArgs) -> Result<Value, AppError> {
        let base = format!("/lookup/{}/{}", args.kind, args.system);
        match args.name {
            Some(name) => {
                self.read(Tag::Lookups, &format!("{base}/{name}"), || {
                    client.lookup_entity::<Value>(args.kind, &args.system, &name)
                })
                .await
            }
            None => {
                let params = ListParams {
                    page: args.page,
                    per_page: args.per_page,
                    search: args.search,
                    ..Default::default()
                };
                let key = format!(
                    "{base}?page={:?}&per_page={:?}&search={:?}",
                    params.page, params.per_page, params.search
                );
                self.read(Tag::Lookups, &key, || {
                    client.lookup_list::<Value>(args.kind, &args.system, Some(&params))
                })
                .await
            }
        }
    }

    // ========================================================================
    // Oracle
    // ========================================================================

    async fn oracle(&self, client: &GatewayClient, cmd: OracleCommand) -> Result<Value, AppError> {
        match cmd {
            OracleCommand::YesNo {
                question,
                odds,
                chaos,
            } => {
                let request = YesNoRequest {
                    question,
                    odds,
                    chaos,
                };
                unwrap(client.yes_no::<Value>(&request).await?)
            }
            OracleCommand::Scene { chaos } => {
                let request = SceneCheckRequest {
                    chaos,
                    flavor: None,
                };
                unwrap(client.scene_check::<Value>(&request).await?)
            }
            OracleCommand::Meaning { question, table } => {
                unwrap(client.meaning::<Value>(&MeaningRequest { question, table }).await?)
            }
            OracleCommand::MeaningTables => {
                self.read(Tag::Oracle, "/oracle/meaning/tables", || {
                    client.meaning_tables::<Value>()
                })
                .await
            }
            OracleCommand::Tables { system, category } => {
                let key = format!("/oracle/tables/{system}?category={category:?}");
                self.read(Tag::Oracle, &key, || {
                    client.list_oracle_tables::<Value>(&system, category.as_deref())
                })
                .await
            }
            OracleCommand::Table { system, name } => {
                let key = format!("/oracle/tables/{system}/{name}");
                self.read(Tag::Oracle, &key, || client.get_oracle_table::<Value>(&system, &name))
                    .await
            }
            OracleCommand::Roll {
                system,
                name,
                custom_roll,
            } => unwrap(
                client
                    .roll_oracle_table::<Value>(&system, &name, custom_roll)
                    .await?,
            ),
        }
    }

    // ========================================================================
    // Generators
    // ========================================================================

    async fn generators(&self, client: &GatewayClient, cmd: GeneratorCommand) -> Result<Value, AppError> {
        match cmd {
            GeneratorCommand::Categories => {
                self.read(Tag::Generators, "/generators/categories", || {
                    client.generator_categories::<Value>()
                })
                .await
            }
            GeneratorCommand::List { system, category } => {
                let key = format!("/generators/{system}?category={category:?}");
                self.read(Tag::Generators, &key, || {
                    client.list_generators::<Value>(&system, category.as_deref())
                })
                .await
            }
            GeneratorCommand::Show { system, name } => {
                let key = format!("/generators/{system}/{name}");
                self.read(Tag::Generators, &key, || client.get_generator::<Value>(&system, &name))
                    .await
            }
            GeneratorCommand::Run {
                system,
                name,
                params,
            } => {
                let parameters = match params {
                    Some(params) => parse_object(&params)?,
                    None => json!({}),
                };
                unwrap(client.run_generator::<Value, _>(&system, &name, &parameters).await?)
            }
            GeneratorCommand::Custom => {
                self.read(Tag::Generators, "/generators/custom", || {
                    client.custom_generators::<Value>()
                })
                .await
            }
            GeneratorCommand::Roll {
                category,
                file,
                table_id,
            } => {
                let request = oracle_forge_client::GeneratorRollRequest {
                    category,
                    file,
                    table_id,
                };
                unwrap(client.roll_generator_table::<Value>(&request).await?)
            }
        }
    }

    // ========================================================================
    // Combat
    // ========================================================================

    async fn combat(&self, client: &GatewayClient, cmd: CombatCommand) -> Result<Value, AppError> {
        match cmd {
            CombatCommand::List { adventure } => {
                let key = format!("/combat/{adventure}/sessions");
                self.read(Tag::Combat, &key, || client.list_combat_sessions::<Value>(&adventure))
                    .await
            }
            CombatCommand::Show { id } => {
                let key = format!("/combat/sessions/{id}");
                self.read(Tag::Combat, &key, || client.get_combat_session::<Value>(&id))
                    .await
            }
            CombatCommand::Create { data } => {
                let body = parse_object(&data)?;
                self.mutate(Tag::Combat, client.create_combat_session::<Value, _>(&body))
                    .await
            }
            CombatCommand::Delete { id } => {
                self.mutate(Tag::Combat, client.delete_combat_session::<Value>(&id))
                    .await
            }
            CombatCommand::Initiative { id } => {
                self.mutate(Tag::Combat, client.roll_initiative::<Value>(&id)).await
            }
            CombatCommand::Next { id } => self.mutate(Tag::Combat, client.next_turn::<Value>(&id)).await,
            CombatCommand::Update { id, data } => {
                let body = parse_object(&data)?;
                self.mutate(Tag::Combat, client.update_combat_session::<Value, _>(&id, &body))
                    .await
            }
            CombatCommand::Start { monsters } => {
                let request = CombatStartRequest { monsters };
                self.mutate(Tag::Combat, client.start_combat::<Value>(&request))
                    .await
            }
            CombatCommand::Attack { attacker, defender } => {
                let attacker = parse_object(&attacker)?;
                let defender = parse_object(&defender)?;
                self.mutate(Tag::Combat, client.combat_attack::<Value, _>(&attacker, &defender))
                    .await
            }
            CombatCommand::Status => {
                self.read(Tag::Combat, "/combat/status", || client.combat_status::<Value>())
                    .await
            }
        }
    }

    // ========================================================================
    // Maps
    // ========================================================================

    async fn maps(&self, client: &GatewayClient, cmd: MapCommand) -> Result<Value, AppError> {
        match cmd {
            MapCommand::Has { adventure } => {
                let present = client.has_map_file(&adventure).await?;
                Ok(json!({ "adventure": adventure, "has_map_file": present }))
            }
            MapCommand::Download { adventure, output } => {
                let blob = unwrap(client.download_map_file(&adventure).await?)?;
                save_blob(blob, &output).await
            }
            MapCommand::Upload {
                adventure,
                file,
                custom,
            } => {
                let payload = FilePayload::from_path(&file).await?;
                if custom {
                    self.mutate(Tag::Maps, client.upload_custom_map::<Value>(&adventure, payload))
                        .await
                } else {
                    self.mutate(Tag::Maps, client.upload_map::<Value>(&adventure, payload))
                        .await
                }
            }
            MapCommand::List { adventure } => {
                let key = format!("/adventures/{adventure}/custom_maps");
                self.read(Tag::Maps, &key, || async {
                    client
                        .list_custom_maps(&adventure)
                        .await
                        .map(|env| env.map(|names| json!(names)))
                })
                .await
            }
            MapCommand::Image {
                adventure,
                filename,
                output,
            } => {
                let blob = unwrap(client.custom_map_image(&adventure, &filename).await?)?;
                save_blob(blob, &output).await
            }
        }
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Cached read. Stale data is returned and the failure logged.
    async fn read<F, Fut>(&self, tag: Tag, key: &str, fetch: F) -> Result<Value, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Fetched>,
    {
        match self.cache.read(key, tag, fetch).await {
            QueryResult::Hit(data) | QueryResult::Fetched(data) => Ok(data),
            QueryResult::Stale { data, error } => {
                warn!(key, error = %error.banner(), "refresh failed, showing cached data");
                Ok(data)
            }
            QueryResult::Failed(error) => Err(error),
        }
    }

    /// Uncached write; a successful result invalidates the touched families.
    async fn mutate<Fut>(&self, tag: Tag, call: Fut) -> Result<Value, AppError>
    where
        Fut: Future<Output = Fetched>,
    {
        let data = unwrap(call.await?)?;
        let count = self.cache.invalidate(tag);
        debug!(?tag, count, "mutation applied");
        Ok(data)
    }
}

fn unwrap<T>(envelope: Envelope<T>) -> Result<T, AppError> {
    envelope.into_result().map_err(AppError::from)
}

/// Parses a JSON object argument.
fn parse_object(raw: &str) -> Result<Value, AppError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(AppError::InvalidInput(
            "expected a JSON object".to_string(),
        )),
        Err(err) => Err(AppError::InvalidInput(format!("invalid JSON: {err}"))),
    }
}

async fn save_blob(blob: Blob, output: &Path) -> Result<Value, AppError> {
    tokio::fs::write(output, &blob.bytes).await?;
    Ok(json!({
        "file": output.display().to_string(),
        "bytes": blob.len(),
        "content_type": blob.content_type,
    }))
}

/// Renders data for the terminal.
#[must_use]
pub fn render(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
