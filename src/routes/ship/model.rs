use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::is_valid_email;

const SHIP_COLUMNS: &str = "id, ship_uid, name, source, destination, email, \
     is_traveling, is_archived, crew, created_at, updated_at";

/// Crew entries are value objects embedded in the ship record; they carry
/// no identity of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub id: Uuid,
    #[serde(rename = "shipUID")]
    pub ship_uid: String,
    pub name: String,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub email: String,
    pub is_traveling: bool,
    pub is_archived: bool,
    pub crew: Json<Vec<CrewMember>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipRequest {
    #[serde(rename = "shipUID", default)]
    pub ship_uid: String,
    #[serde(default)]
    pub name: String,
    pub source: Option<String>,
    pub destination: Option<String>,
    #[serde(default)]
    pub email: String,
    pub is_traveling: Option<bool>,
    pub is_archived: Option<bool>,
    pub crew: Option<Vec<CrewMember>>,
}

/// Partial update: absent (or null) fields keep their stored value, an
/// explicit `false` or empty string is an overwrite. `shipUID` is immutable
/// and deliberately not accepted here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShipRequest {
    pub name: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub email: Option<String>,
    pub is_traveling: Option<bool>,
    pub is_archived: Option<bool>,
    pub crew: Option<Vec<CrewMember>>,
}

/// Chosen schema rule: a traveling ship must carry non-blank source and
/// destination ports; an idle ship may leave both unset.
pub fn validate_travel_requirements(
    is_traveling: bool,
    source: Option<&str>,
    destination: Option<&str>,
) -> Result<(), AppError> {
    if !is_traveling {
        return Ok(());
    }
    if source.map_or(true, |port| port.trim().is_empty()) {
        return Err(AppError::Validation(
            "Source port is required when the ship is traveling".into(),
        ));
    }
    if destination.map_or(true, |port| port.trim().is_empty()) {
        return Err(AppError::Validation(
            "Destination port is required when the ship is traveling".into(),
        ));
    }
    Ok(())
}

fn validate_crew(crew: &[CrewMember]) -> Result<(), AppError> {
    for member in crew {
        if member.name.trim().is_empty() {
            return Err(AppError::Validation("Crew member name is required".into()));
        }
        if member.role.trim().is_empty() {
            return Err(AppError::Validation("Crew member role is required".into()));
        }
    }
    Ok(())
}

impl CreateShipRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ship_uid.trim().is_empty() {
            return Err(AppError::Validation("Ship UID is required".into()));
        }
        if self.name.trim().chars().count() < 2 {
            return Err(AppError::Validation(
                "Ship name must be at least 2 characters long".into(),
            ));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(AppError::Validation("Please enter a valid email".into()));
        }
        if let Some(crew) = &self.crew {
            validate_crew(crew)?;
        }
        validate_travel_requirements(
            self.is_traveling.unwrap_or(false),
            self.source.as_deref(),
            self.destination.as_deref(),
        )
    }
}

impl UpdateShipRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().chars().count() < 2 {
                return Err(AppError::Validation(
                    "Ship name must be at least 2 characters long".into(),
                ));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email.trim()) {
                return Err(AppError::Validation("Invalid email format".into()));
            }
        }
        if let Some(crew) = &self.crew {
            validate_crew(crew)?;
        }
        Ok(())
    }
}

impl Ship {
    /// Folds a partial update into the stored record. The travel rule is
    /// re-checked by the caller on the merged result.
    pub fn apply_update(&mut self, req: UpdateShipRequest) {
        if let Some(name) = req.name {
            self.name = name;
        }
        if let Some(source) = req.source {
            self.source = Some(source);
        }
        if let Some(destination) = req.destination {
            self.destination = Some(destination);
        }
        if let Some(email) = req.email {
            self.email = email.to_lowercase();
        }
        if let Some(is_traveling) = req.is_traveling {
            self.is_traveling = is_traveling;
        }
        if let Some(is_archived) = req.is_archived {
            self.is_archived = is_archived;
        }
        if let Some(crew) = req.crew {
            self.crew = Json(crew);
        }
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!("SELECT {SHIP_COLUMNS} FROM ships ORDER BY created_at DESC");

        sqlx::query_as::<_, Ship>(&sql).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {SHIP_COLUMNS} FROM ships WHERE id = $1");

        sqlx::query_as::<_, Ship>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn uid_exists(pool: &PgPool, ship_uid: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ships WHERE ship_uid = $1)")
            .bind(ship_uid)
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, req: CreateShipRequest) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO ships (id, ship_uid, name, source, destination, email, \
             is_traveling, is_archived, crew) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {SHIP_COLUMNS}"
        );

        sqlx::query_as::<_, Ship>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.ship_uid.trim())
            .bind(req.name.trim())
            .bind(req.source)
            .bind(req.destination)
            .bind(req.email.trim().to_lowercase())
            .bind(req.is_traveling.unwrap_or(false))
            .bind(req.is_archived.unwrap_or(false))
            .bind(Json(req.crew.unwrap_or_default()))
            .fetch_one(pool)
            .await
    }

    pub async fn save(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE ships SET name = $1, source = $2, destination = $3, email = $4, \
             is_traveling = $5, is_archived = $6, crew = $7, updated_at = now() \
             WHERE id = $8",
        )
        .bind(&self.name)
        .bind(&self.source)
        .bind(&self.destination)
        .bind(&self.email)
        .bind(self.is_traveling)
        .bind(self.is_archived)
        .bind(&self.crew)
        .bind(self.id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM ships WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateShipRequest {
        CreateShipRequest {
            ship_uid: "SHIP-001".into(),
            name: "Evergreen".into(),
            source: None,
            destination: None,
            email: "ops@fleet.com".into(),
            is_traveling: None,
            is_archived: None,
            crew: None,
        }
    }

    fn stored_ship() -> Ship {
        Ship {
            id: Uuid::new_v4(),
            ship_uid: "SHIP-001".into(),
            name: "Evergreen".into(),
            source: Some("Rotterdam".into()),
            destination: Some("Singapore".into()),
            email: "ops@fleet.com".into(),
            is_traveling: true,
            is_archived: false,
            crew: Json(vec![CrewMember {
                name: "Mara".into(),
                role: "Captain".into(),
            }]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_requires_uid_name_and_email() {
        let mut req = valid_create();
        req.ship_uid = "  ".into();
        assert!(req.validate().is_err());

        let mut req = valid_create();
        req.name = "E".into();
        assert!(req.validate().is_err());

        let mut req = valid_create();
        req.email = "not-an-email".into();
        assert!(req.validate().is_err());

        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn traveling_ship_needs_both_ports() {
        let mut req = valid_create();
        req.is_traveling = Some(true);
        assert!(req.validate().is_err());

        req.source = Some("Rotterdam".into());
        assert!(req.validate().is_err());

        req.destination = Some("Singapore".into());
        assert!(req.validate().is_ok());

        // Idle ships may omit both ports.
        let req = valid_create();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn crew_entries_must_be_complete() {
        let mut req = valid_create();
        req.crew = Some(vec![CrewMember {
            name: "Mara".into(),
            role: String::new(),
        }]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_merge_keeps_absent_fields() {
        let mut ship = stored_ship();
        ship.apply_update(UpdateShipRequest {
            name: Some("Ever Given".into()),
            source: None,
            destination: None,
            email: None,
            is_traveling: None,
            is_archived: None,
            crew: None,
        });

        assert_eq!(ship.name, "Ever Given");
        assert_eq!(ship.source.as_deref(), Some("Rotterdam"));
        assert_eq!(ship.destination.as_deref(), Some("Singapore"));
        assert_eq!(ship.email, "ops@fleet.com");
        assert!(ship.is_traveling);
        assert_eq!(ship.crew.0.len(), 1);
    }

    #[test]
    fn update_merge_preserves_explicit_false() {
        let mut ship = stored_ship();
        ship.apply_update(UpdateShipRequest {
            name: None,
            source: None,
            destination: None,
            email: None,
            is_traveling: Some(false),
            is_archived: None,
            crew: Some(vec![]),
        });

        assert!(!ship.is_traveling);
        assert!(ship.crew.0.is_empty());
    }

    #[test]
    fn merged_traveling_state_is_rechecked() {
        let mut ship = stored_ship();
        ship.source = None;
        ship.is_traveling = false;
        ship.apply_update(UpdateShipRequest {
            name: None,
            source: None,
            destination: None,
            email: None,
            is_traveling: Some(true),
            is_archived: None,
            crew: None,
        });

        let result = validate_travel_requirements(
            ship.is_traveling,
            ship.source.as_deref(),
            ship.destination.as_deref(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn wire_shape_uses_camel_case_and_ship_uid_casing() {
        let json = serde_json::to_value(stored_ship()).unwrap();
        assert!(json.get("shipUID").is_some());
        assert!(json.get("isTraveling").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("ship_uid").is_none());
        assert_eq!(json["crew"][0]["role"], "Captain");
    }
}
