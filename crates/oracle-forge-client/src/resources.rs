//! Per-family convenience wrappers over the base verbs.
//!
//! Each method only knows its route template; every user-supplied segment
//! (adventure ids, entity names, file names, system ids) is percent-encoded
//! before it is placed in the path.

use crate::client::{GatewayClient, encode_segment as seg};
use crate::envelope::Envelope;
use crate::error::Error;
use crate::types::{
    ActiveAdventure, AttackRequest, Blob, CharacterUpdate, CombatStartRequest, EntityRequest,
    EntityType, FilePayload, GeneratorFlavorRequest, GeneratorParameters, GeneratorRollRequest,
    ListParams, LogEntry, LookupKind, LookupRandomRequest, LookupSearchRequest,
    MeaningFlavorRequest, MeaningRequest, Query, SceneCheckRequest, SceneFlavorRequest,
    WorldEntityRequest, YesNoFlavorRequest, YesNoRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;


type Response<T> = Result<Envelope<T>, Error>;

impl GatewayClient {
    // ========================================================================
    // Health
    // ========================================================================

    /// `GET /health`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/health", None).await
    }

    /// `GET /config/status`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn config_status<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/config/status", None).await
    }

    // ========================================================================
    // Adventures
    // ========================================================================

    /// Lists adventures.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_adventures<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/adventures/list", None).await
    }

    /// Fetches one adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_adventure<T: DeserializeOwned>(&self, id: &str) -> Response<T> {
        self.get(&format!("/adventures/{}", seg(id)), None).await
    }

    /// Creates an adventure; `data` is wrapped as `{ "data": ... }`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_adventure<T, B>(&self, data: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post("/adventures", Some(&EntityRequest { data })).await
    }

    /// Updates an adventure; `data` is wrapped as `{ "data": ... }`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_adventure<T, B>(&self, id: &str, data: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(&format!("/adventures/{}", seg(id)), &EntityRequest { data })
            .await
    }

    /// Deletes an adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_adventure<T: DeserializeOwned>(&self, id: &str) -> Response<T> {
        self.delete(&format!("/adventures/{}", seg(id))).await
    }

    /// Returns the adventure currently selected on the backend.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn active_adventure(&self) -> Response<ActiveAdventure> {
        self.get("/adventures/active", None).await
    }

    /// Makes `id` the active adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn select_adventure<T: DeserializeOwned>(&self, id: &str) -> Response<T> {
        self.action(&format!("/adventures/select/{}", seg(id))).await
    }

    /// Clears the active adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn clear_active_adventure<T: DeserializeOwned>(&self) -> Response<T> {
        self.action("/adventures/clear").await
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Lists the play sessions of an adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_sessions<T: DeserializeOwned>(&self, adventure: &str) -> Response<T> {
        self.get(&sessions_path(adventure), None).await
    }

    /// Fetches one play session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_session<T: DeserializeOwned>(
        &self,
        adventure: &str,
        session: &str,
    ) -> Response<T> {
        self.get(&session_path(adventure, session), None).await
    }

    /// Starts a play session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_session<T, B>(&self, adventure: &str, body: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(&sessions_path(adventure), Some(body)).await
    }

    /// Updates a play session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_session<T, B>(&self, adventure: &str, session: &str, body: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(&session_path(adventure, session), body).await
    }

    /// Deletes a play session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_session<T: DeserializeOwned>(
        &self,
        adventure: &str,
        session: &str,
    ) -> Response<T> {
        self.delete(&session_path(adventure, session)).await
    }

    /// State of the session bound to the active adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn session_state<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/session/state", None).await
    }

    /// Journal of the current session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn session_log<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/session/log", None).await
    }

    /// Appends an entry to the session journal.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn append_session_log<T: DeserializeOwned>(&self, entry: &LogEntry) -> Response<T> {
        self.post("/session/log", Some(entry)).await
    }

    /// Ends the current session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn end_session<T: DeserializeOwned>(&self) -> Response<T> {
        self.action("/session/end").await
    }

    /// Creates a character in the current session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_character<T, B>(&self, character: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post("/session/character", Some(character)).await
    }

    /// Fetches a character sheet by name.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_character<T: DeserializeOwned>(&self, name: &str) -> Response<T> {
        self.get(&format!("/session/character/{}", seg(name)), None)
            .await
    }

    /// Replaces a character sheet; sent as `{ "character": ... }`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_character<T, B>(&self, name: &str, character: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(
            &format!("/session/character/{}", seg(name)),
            &CharacterUpdate { character },
        )
        .await
    }

    // ========================================================================
    // World
    // ========================================================================

    /// Aggregate world state of an adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn world_state<T: DeserializeOwned>(&self, adventure: &str) -> Response<T> {
        self.get(&format!("/adventures/{}/world_state", seg(adventure)), None)
            .await
    }

    /// Replaces the aggregate world state of an adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_world_state<T, B>(&self, adventure: &str, state: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(
            &format!("/adventures/{}/world_state", seg(adventure)),
            Some(state),
        )
        .await
    }

    /// Lists world entities of one type.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_world_entities<T: DeserializeOwned>(
        &self,
        adventure: &str,
        entity_type: EntityType,
    ) -> Response<T> {
        self.get(&world_path(adventure, entity_type), None).await
    }

    /// Fetches one world entity.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_world_entity<T: DeserializeOwned>(
        &self,
        adventure: &str,
        entity_type: EntityType,
        name: &str,
    ) -> Response<T> {
        self.get(&world_entity_path(adventure, entity_type, name), None)
            .await
    }

    /// Creates or replaces a world entity; sent as `{ "entity_data": ... }`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn save_world_entity<T, B>(
        &self,
        adventure: &str,
        entity_type: EntityType,
        name: &str,
        entity_data: &B,
    ) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(
            &world_entity_path(adventure, entity_type, name),
            Some(&WorldEntityRequest { entity_data }),
        )
        .await
    }

    /// Deletes a world entity.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_world_entity<T: DeserializeOwned>(
        &self,
        adventure: &str,
        entity_type: EntityType,
        name: &str,
    ) -> Response<T> {
        self.delete(&world_entity_path(adventure, entity_type, name))
            .await
    }

    // ========================================================================
    // Players
    // ========================================================================

    /// Lists player files of an adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_players<T: DeserializeOwned>(&self, adventure: &str) -> Response<T> {
        self.get(&players_path(adventure), None).await
    }

    /// Fetches one player file.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_player<T: DeserializeOwned>(
        &self,
        adventure: &str,
        filename: &str,
    ) -> Response<T> {
        self.get(&player_path(adventure, filename), None).await
    }

    /// Creates a player file.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_player<T, B>(&self, adventure: &str, player: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(&players_path(adventure), Some(player)).await
    }

    /// Replaces a player file.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_player<T, B>(&self, adventure: &str, filename: &str, player: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(&player_path(adventure, filename), player).await
    }

    /// Deletes a player file.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_player<T: DeserializeOwned>(
        &self,
        adventure: &str,
        filename: &str,
    ) -> Response<T> {
        self.delete(&player_path(adventure, filename)).await
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Lists reference entries of one kind for a game system.
    ///
    /// # Errors
    /// Returns error if the request fails or `params` is not a flat object.
    pub async fn lookup_list<T: DeserializeOwned>(
        &self,
        kind: LookupKind,
        system: &str,
        params: Option<&ListParams>,
    ) -> Response<T> {
        let query = params.map(Query::from_serialize).transpose()?;
        self.get(
            &format!("/lookup/{}/{}", kind.as_str(), seg(system)),
            query.as_ref(),
        )
        .await
    }

    /// Fetches one reference entry by name.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn lookup_entity<T: DeserializeOwned>(
        &self,
        kind: LookupKind,
        system: &str,
        name: &str,
    ) -> Response<T> {
        self.get(
            &format!("/lookup/{}/{}/{}", kind.as_str(), seg(system), seg(name)),
            None,
        )
        .await
    }

    /// Searches reference entries of one kind by name or text.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn lookup_search<T: DeserializeOwned>(
        &self,
        kind: LookupKind,
        request: &LookupSearchRequest,
    ) -> Response<T> {
        self.post(&format!("/lookup/{}", kind.search_segment()), Some(request))
            .await
    }

    /// Draws random reference entries of one kind.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRequest`] for rules, which cannot be drawn at
    /// random, and error if the request fails.
    pub async fn lookup_random<T: DeserializeOwned>(
        &self,
        kind: LookupKind,
        request: &LookupRandomRequest,
    ) -> Response<T> {
        if !kind.has_random() {
            return Err(Error::InvalidRequest(format!(
                "random lookup is not available for {kind}"
            )));
        }
        self.post(
            &format!("/lookup/{}/random", kind.search_segment()),
            Some(request),
        )
        .await
    }

    /// Lookup categories known to the backend.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn lookup_categories<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/lookup/categories", None).await
    }

    /// Game systems with reference data.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn lookup_systems<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/lookup/systems", None).await
    }

    // ========================================================================
    // Oracle
    // ========================================================================

    /// Asks the yes/no oracle.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn yes_no<T: DeserializeOwned>(&self, request: &YesNoRequest) -> Response<T> {
        self.post("/oracle/yesno", Some(request)).await
    }

    /// Narrates a yes/no answer.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn yes_no_flavor<T: DeserializeOwned>(
        &self,
        request: &YesNoFlavorRequest,
    ) -> Response<T> {
        self.post("/oracle/yesno/flavor", Some(request)).await
    }

    /// Checks whether the next scene is altered or interrupted.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn scene_check<T: DeserializeOwned>(&self, request: &SceneCheckRequest) -> Response<T> {
        self.post("/oracle/scene", Some(request)).await
    }

    /// Narrates a scene setup.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn scene_flavor<T: DeserializeOwned>(
        &self,
        request: &SceneFlavorRequest,
    ) -> Response<T> {
        self.post("/oracle/scene/flavor", Some(request)).await
    }

    /// Rolls on a meaning table.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn meaning<T: DeserializeOwned>(&self, request: &MeaningRequest) -> Response<T> {
        self.post("/oracle/meaning", Some(request)).await
    }

    /// Narrates rolled meaning keywords.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn meaning_flavor<T: DeserializeOwned>(
        &self,
        request: &MeaningFlavorRequest,
    ) -> Response<T> {
        self.post("/oracle/meaning/flavor", Some(request)).await
    }

    /// Names of the available meaning tables.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn meaning_tables<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/oracle/meaning/tables", None).await
    }

    /// Lists oracle tables of a system, optionally within one category.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_oracle_tables<T: DeserializeOwned>(
        &self,
        system: &str,
        category: Option<&str>,
    ) -> Response<T> {
        let query = Query::new().opt("category", category);
        self.get(&format!("/oracle/tables/{}", seg(system)), Some(&query))
            .await
    }

    /// Fetches one oracle table.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_oracle_table<T: DeserializeOwned>(
        &self,
        system: &str,
        name: &str,
    ) -> Response<T> {
        self.get(&oracle_table_path(system, name), None).await
    }

    /// Rolls on an oracle table, optionally forcing the die result.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn roll_oracle_table<T: DeserializeOwned>(
        &self,
        system: &str,
        name: &str,
        custom_roll: Option<u32>,
    ) -> Response<T> {
        let query = Query::new().opt("custom_roll", custom_roll);
        self.get(
            &format!("{}/roll", oracle_table_path(system, name)),
            Some(&query),
        )
        .await
    }

    // ========================================================================
    // Generators
    // ========================================================================

    /// Lists generators of a system, optionally within one category.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_generators<T: DeserializeOwned>(
        &self,
        system: &str,
        category: Option<&str>,
    ) -> Response<T> {
        let query = Query::new().opt("category", category);
        self.get(&format!("/generators/{}", seg(system)), Some(&query))
            .await
    }

    /// Fetches one generator definition.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_generator<T: DeserializeOwned>(
        &self,
        system: &str,
        name: &str,
    ) -> Response<T> {
        self.get(&generator_path(system, name), None).await
    }

    /// Runs a generator with the given parameters.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn run_generator<T, B>(&self, system: &str, name: &str, parameters: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(
            &format!("{}/run", generator_path(system, name)),
            Some(parameters),
        )
        .await
    }

    /// Generator categories.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn generator_categories<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/generators/categories", None).await
    }

    /// Custom generators available for the active system.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn custom_generators<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/generators/custom", None).await
    }

    /// Runs a custom generator; sent as `{ "parameters": ... }`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn run_custom_generator<T, B>(
        &self,
        category: &str,
        system: &str,
        id: &str,
        parameters: &B,
    ) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(
            &format!(
                "/generators/custom/{}/{}/{}",
                seg(category),
                seg(system),
                seg(id)
            ),
            Some(&GeneratorParameters { parameters }),
        )
        .await
    }

    /// Rolls one table of a generator file.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn roll_generator_table<T: DeserializeOwned>(
        &self,
        request: &GeneratorRollRequest,
    ) -> Response<T> {
        self.post("/generators/roll", Some(request)).await
    }

    /// Narrates a generated result.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn generator_flavor<T: DeserializeOwned>(
        &self,
        request: &GeneratorFlavorRequest,
    ) -> Response<T> {
        self.post("/generators/flavor", Some(request)).await
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Lists combat sessions of an adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_combat_sessions<T: DeserializeOwned>(&self, adventure: &str) -> Response<T> {
        self.get(&format!("/combat/{}/sessions", seg(adventure)), None)
            .await
    }

    /// Fetches one combat session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_combat_session<T: DeserializeOwned>(&self, id: &str) -> Response<T> {
        self.get(&combat_path(id), None).await
    }

    /// Creates a combat session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_combat_session<T, B>(&self, body: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post("/combat/sessions", Some(body)).await
    }

    /// Updates a combat session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_combat_session<T, B>(&self, id: &str, body: &B) -> Response<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(&combat_path(id), body).await
    }

    /// Deletes a combat session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_combat_session<T: DeserializeOwned>(&self, id: &str) -> Response<T> {
        self.delete(&combat_path(id)).await
    }

    /// Rolls initiative for every combatant.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn roll_initiative<T: DeserializeOwned>(&self, id: &str) -> Response<T> {
        self.action(&format!("{}/roll-initiative", combat_path(id)))
            .await
    }

    /// Advances to the next turn.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn next_turn<T: DeserializeOwned>(&self, id: &str) -> Response<T> {
        self.action(&format!("{}/next-turn", combat_path(id))).await
    }

    /// Starts an encounter against the named monsters; the backend rolls
    /// initiative for players and monsters.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn start_combat<T: DeserializeOwned>(
        &self,
        request: &CombatStartRequest,
    ) -> Response<T> {
        self.post("/combat/start", Some(request)).await
    }

    /// Resolves one attack between two combatants.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn combat_attack<T, C>(&self, attacker: &C, defender: &C) -> Response<T>
    where
        T: DeserializeOwned,
        C: Serialize + ?Sized,
    {
        self.post("/combat/attack", Some(&AttackRequest { attacker, defender }))
            .await
    }

    /// State of the running encounter.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn combat_status<T: DeserializeOwned>(&self) -> Response<T> {
        self.get("/combat/status", None).await
    }

    // ========================================================================
    // Maps
    // ========================================================================

    /// True if the adventure has a world map file. Never downloads it.
    ///
    /// # Errors
    /// Returns error on transport failure, rate limiting or cancellation.
    pub async fn has_map_file(&self, adventure: &str) -> Result<bool, Error> {
        self.head(&map_file_path(adventure)).await
    }

    /// Downloads the world map file.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn download_map_file(&self, adventure: &str) -> Response<Blob> {
        self.get_blob(&map_file_path(adventure)).await
    }

    /// Uploads the world map file.
    ///
    /// # Errors
    /// Returns error if the request fails or the file part cannot be built.
    pub async fn upload_map<T: DeserializeOwned>(
        &self,
        adventure: &str,
        file: FilePayload,
    ) -> Response<T> {
        self.post_file(&format!("/adventures/{}/upload_map", seg(adventure)), file)
            .await
    }

    /// File names of the custom map images of an adventure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_custom_maps(&self, adventure: &str) -> Response<Vec<String>> {
        self.get(&format!("/adventures/{}/custom_maps", seg(adventure)), None)
            .await
    }

    /// Downloads one custom map image.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn custom_map_image(&self, adventure: &str, filename: &str) -> Response<Blob> {
        self.get_blob(&format!(
            "/adventures/{}/custom_maps/{}",
            seg(adventure),
            seg(filename)
        ))
        .await
    }

    /// Uploads a custom map image.
    ///
    /// # Errors
    /// Returns error if the request fails or the file part cannot be built.
    pub async fn upload_custom_map<T: DeserializeOwned>(
        &self,
        adventure: &str,
        file: FilePayload,
    ) -> Response<T> {
        self.post_file(
            &format!("/adventures/{}/upload_custom_map", seg(adventure)),
            file,
        )
        .await
    }

    /// Bodiless `POST` for action routes.
    async fn action<T: DeserializeOwned>(&self, path: &str) -> Response<T> {
        self.post::<T, ()>(path, None).await
    }
}

fn sessions_path(adventure: &str) -> String {
    format!("/adventures/{}/sessions", seg(adventure))
}

fn session_path(adventure: &str, session: &str) -> String {
    format!("{}/{}", sessions_path(adventure), seg(session))
}

fn world_path(adventure: &str, entity_type: EntityType) -> String {
    format!("/adventures/{}/world/{}", seg(adventure), entity_type.as_str())
}

fn world_entity_path(adventure: &str, entity_type: EntityType, name: &str) -> String {
    format!("{}/{}", world_path(adventure, entity_type), seg(name))
}

fn players_path(adventure: &str) -> String {
    format!("/adventures/{}/players", seg(adventure))
}

fn player_path(adventure: &str, filename: &str) -> String {
    format!("{}/{}", players_path(adventure), seg(filename))
}

fn oracle_table_path(system: &str, name: &str) -> String {
    format!("/oracle/tables/{}/{}", seg(system), seg(name))
}

fn generator_path(system: &str, name: &str) -> String {
    format!("/generators/{}/{}", seg(system), seg(name))
}

fn combat_path(id: &str) -> String {
    format!("/combat/sessions/{}", seg(id))
}

fn map_file_path(adventure: &str) -> String {
    format!("/adventures/{}/map_file", seg(adventure))
}
