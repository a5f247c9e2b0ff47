//! The Haunted service API.
//!
//! Every type and route the server and frontend share is declared here;
//! `apigen generate` turns this registry into the checked-in outputs.

use apigen_registry::{Endpoint, Registry, RegistryBuilder, RegistryError};
use apigen_schema::{Field, Schema};

/// A non-empty string.
fn text() -> Field {
    Field::string().min_length(1)
}

fn count() -> Field {
    Field::integer().min(0)
}

/// Every named scalar and record the service uses.
pub fn haunted_schema() -> Schema {
    let mut schema = Schema::new();

    schema
        .scalar("TagName", text())
        // 2022-11-20T13:45:18.188Z
        .scalar(
            "IsoDateTime",
            Field::string().pattern(
                r"[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(\+[0-9]{2}:[0-9]{2}|Z)",
            ),
        )
        .record(
            "TimeSpan",
            vec![
                ("start", Field::reference("IsoDateTime")),
                ("end", Field::reference("IsoDateTime")),
            ],
        );

    schema
        .record(
            "ServerInfoResponse",
            vec![
                ("total_users", count()),
                ("total_sessions", count()),
                ("total_ghosts", count()),
                ("total_ghost_duration", count()),
                ("coop_url", text()),
            ],
        )
        .record("Empty", Vec::<(&str, Field)>::new())
        .record(
            "SuccessResponse",
            vec![("success", Field::boolean()), ("message", Field::string())],
        );

    // Accounts
    schema
        .record(
            "ProfileInfoResponse",
            vec![
                ("username", text()),
                ("authenticated", Field::boolean()),
                ("email", text().nullable()),
                ("auth_token", text().nullable()),
                ("is_staff", Field::boolean()),
            ],
        )
        .record("ChangeUsernameRequest", vec![("username", text())])
        .record("LoginRequest", vec![("username", text()), ("password", text())])
        .record(
            "RegisterRequest",
            vec![("username", text()), ("password", text()), ("email", text())],
        )
        .record("ChangePasswordRequest", vec![("password", text())])
        .record("ChangeEmailRequest", vec![("email", text())]);

    // Sessions
    schema
        .record(
            "Tag",
            vec![
                ("id", Field::integer()),
                ("name", Field::reference("TagName")),
                ("description", Field::string()),
            ],
        )
        .record("TagsResponse", vec![("tags", Field::array(Field::reference("Tag")))])
        .record(
            "Session",
            vec![
                ("id", text()),
                ("tags", Field::array(Field::reference("Tag"))),
                ("owner", text()),
                ("description", Field::string()),
                ("players", Field::array(text())),
                ("time", Field::reference("TimeSpan").nullable()),
                ("private", Field::boolean()),
            ],
        )
        .record(
            "CreateSessionRequest",
            vec![
                ("description", Field::string().max_length(512)),
                ("tags", Field::array(Field::integer())),
                ("time", Field::reference("TimeSpan").nullable()),
                ("private", Field::boolean()),
            ],
        )
        .record(
            "SessionsResponse",
            vec![("sessions", Field::array(Field::reference("Session")))],
        )
        .record(
            "SessionResponse",
            vec![("session", Field::reference("Session").nullable())],
        )
        .record(
            "SessionAccessRequest",
            vec![
                ("username", text()),
                ("auth_token", text()),
                ("session_id", text()),
                ("api_key", text()),
            ],
        )
        .record(
            "SessionPlayers",
            vec![("session_id", text()), ("usernames", Field::array(text()))],
        )
        .record(
            "SessionsPlayersRequest",
            vec![
                ("sessions", Field::array(Field::reference("SessionPlayers"))),
                ("api_key", text()),
            ],
        )
        .record(
            "AnnouncementEntry",
            vec![
                ("message", text()),
                ("background_color", text()),
                ("text_color", text()),
            ],
        )
        .record(
            "AnnouncementsResponse",
            vec![(
                "announcements",
                Field::array(Field::reference("AnnouncementEntry")),
            )],
        );

    // Ghosts and levels
    schema
        .record(
            "GhostFileResponseEntry",
            vec![
                ("username", text()),
                ("id", Field::integer()),
                ("description", Field::string()),
                ("tags", Field::array(Field::reference("Tag"))),
                ("level_display", text()),
                ("level_identifier", text()),
                ("level_id", Field::integer()),
                ("duration", count()),
                ("size", count()),
                ("finish_type", Field::string()),
                ("downloads", count()),
                ("published", Field::boolean()),
            ],
        )
        .record(
            "GhostFilesResponse",
            vec![("files", Field::array(Field::reference("GhostFileResponseEntry")))],
        )
        .record(
            "GhostFileResponse",
            vec![("ghost", Field::reference("GhostFileResponseEntry").nullable())],
        )
        .record(
            "GhostInfoRequest",
            vec![
                ("description", Field::string()),
                ("tags", Field::array(Field::integer())),
                ("published", Field::boolean()),
                ("level_id", Field::integer()),
            ],
        )
        .record("QuotaResponse", vec![("current", count()), ("max", count())])
        .record(
            "LevelInfo",
            vec![("id", Field::integer()), ("identifier", text()), ("title", text())],
        )
        .record(
            "LevelsResponse",
            vec![("levels", Field::array(Field::reference("LevelInfo")))],
        );

    schema
}

/// The full service registry.
pub fn haunted_registry() -> Result<Registry, RegistryError> {
    let mut api = RegistryBuilder::new(haunted_schema());

    api.register("/api/v0/server-info", "serverInfo")
        .get(Endpoint::new("getServerInfo", "ServerInfoResponse"));
    api.register("/api/v0/tags", "tags")
        .get(Endpoint::new("getTags", "TagsResponse"));

    api.register("/api/v0/sessions", "sessions")
        .get(Endpoint::new("getSessions", "SessionsResponse"))
        .post(Endpoint::new("createSession", "SuccessResponse").body("CreateSessionRequest"));
    api.register("/api/v0/sessions/<str:sessionId>", "session")
        .get(Endpoint::new("getSession", "SessionResponse"))
        .post(Endpoint::new("editSession", "SuccessResponse").body("CreateSessionRequest"))
        .delete(Endpoint::new("deleteSession", "SuccessResponse"));
    api.register("/api/v0/sessions/check-access", "sessionAccess")
        .post(Endpoint::new("checkSessionAccess", "SuccessResponse").body("SessionAccessRequest"));
    api.register("/api/v0/sessions/session-players", "sessionPlayers")
        .post(Endpoint::new("updateSessionsPlayers", "Empty").body("SessionsPlayersRequest"));

    api.register("/api/v0/announcements", "announcements")
        .get(Endpoint::new("getAnnouncements", "AnnouncementsResponse"));

    api.register("/api/v0/auth/profile", "profile")
        .get(Endpoint::new("getProfile", "ProfileInfoResponse"));
    api.register("/api/v0/auth/change-username", "changeUsername")
        .post(Endpoint::new("changeUsername", "SuccessResponse").body("ChangeUsernameRequest"));
    api.register("/api/v0/auth/regenerate-token", "regenerateToken")
        .get(Endpoint::new("regenerateToken", "Empty"));
    api.register("/api/v0/auth/login", "login")
        .post(Endpoint::new("login", "SuccessResponse").body("LoginRequest"));
    api.register("/api/v0/auth/register", "register")
        .post(Endpoint::new("register", "SuccessResponse").body("RegisterRequest"));
    api.register("/api/v0/auth/change-password", "changePassword")
        .post(Endpoint::new("changePassword", "SuccessResponse").body("ChangePasswordRequest"));
    api.register("/api/v0/auth/change-email", "changeEmail")
        .post(Endpoint::new("changeEmail", "SuccessResponse").body("ChangeEmailRequest"));
    api.register("/api/v0/auth/logout", "logout")
        .get(Endpoint::new("logout", "Empty"));

    api.register("/api/v0/ghosts", "ghosts")
        .get(Endpoint::new("getGhosts", "GhostFilesResponse"))
        .post(Endpoint::new("uploadGhost", "SuccessResponse").files());
    api.register("/api/v0/ghosts/<int:id>/download", "download_ghost")
        .get(Endpoint::download("downloadGhost"));
    api.register("/api/v0/ghosts/<int:id>", "single_ghost")
        .get(Endpoint::new("getGhost", "GhostFileResponse"))
        .post(Endpoint::new("updateGhost", "SuccessResponse").body("GhostInfoRequest"))
        .delete(Endpoint::new("deleteGhost", "SuccessResponse"));
    api.register("/api/v0/ghosts/staging", "staging_ghosts")
        .get(Endpoint::new("getStagingGhosts", "GhostFilesResponse"));
    api.register("/api/v0/ghosts/quota", "quota")
        .get(Endpoint::new("getGhostsQuota", "QuotaResponse"));

    api.register("/api/v0/levels/<str:identifier>", "levels")
        .get(Endpoint::new("getAlternativeLevels", "LevelsResponse"));

    api.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigen_registry::Method;

    #[test]
    fn registry_builds() {
        let registry = haunted_registry().unwrap();
        assert_eq!(registry.routes().len(), 21);
        assert_eq!(registry.endpoints().count(), 27);
        assert!(registry.has_uploads());
    }

    #[test]
    fn every_record_is_reachable() {
        let registry = haunted_registry().unwrap();
        let resolved = registry.resolved_types();
        for def in registry.schema().definitions() {
            if def.is_record() {
                assert!(resolved.contains(&def.name), "{} is unreachable", def.name);
            }
        }
        // Both scalars carry rules and get their own validators.
        assert!(resolved.contains("TagName"));
        assert!(resolved.contains("IsoDateTime"));
    }

    #[test]
    fn session_routes() {
        let registry = haunted_registry().unwrap();
        let (route, method, endpoint) = registry.endpoint("editSession").unwrap();
        assert_eq!(method, Method::Post);
        assert_eq!(route.path.params()[0].name, "sessionId");
        assert_eq!(endpoint.body_type(), Some("CreateSessionRequest"));

        let (route, _, endpoint) = registry.endpoint("downloadGhost").unwrap();
        assert_eq!(route.path.name, "download_ghost");
        assert_eq!(endpoint.response_type(), None);
    }
}
