use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Ride-hailing app the user prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteApp {
    NinetyNine = 1,
    Uber = 2,
}

impl FavoriteApp {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(FavoriteApp::NinetyNine),
            2 => Some(FavoriteApp::Uber),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FavoriteApp::NinetyNine => "99",
            FavoriteApp::Uber => "Uber",
        }
    }
}

/// How the user plans rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Passenger = 1,
    Driver = 2,
    Company = 3,
}

impl UserType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(UserType::Passenger),
            2 => Some(UserType::Driver),
            3 => Some(UserType::Company),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserType::Passenger => "passenger",
            UserType::Driver => "driver",
            UserType::Company => "company",
        }
    }
}

// Stored document in the `users` collection
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub cellphone: String,
    pub password_hash: String,
    pub favorite_app: i32,
    pub user_type: i32,
    pub created_at: Option<BsonDateTime>,
}

/// Validated registration data, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub cellphone: String,
    pub password_hash: String,
    pub favorite_app: FavoriteApp,
    pub user_type: UserType,
}

impl NewUser {
    pub fn into_user(self, user_id: String) -> User {
        User {
            _id: None,
            user_id,
            name: self.name,
            email: self.email,
            cellphone: self.cellphone,
            password_hash: self.password_hash,
            favorite_app: self.favorite_app as i32,
            user_type: self.user_type as i32,
            created_at: Some(BsonDateTime::now()),
        }
    }
}

/// Public view of a user, without the password hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct UserProfile {
    #[serde(rename = "UserId")]
    pub id: String,
    #[serde(rename = "UserName")]
    pub name: String,
    #[serde(rename = "UserEmail")]
    pub email: String,
    #[serde(rename = "UserCellphone")]
    pub cellphone: String,
    #[serde(rename = "UserFavoriteApp")]
    pub favorite_app: i32,
    #[serde(rename = "UserFavoriteAppLabel", skip_serializing_if = "Option::is_none")]
    pub favorite_app_label: Option<String>,
    #[serde(rename = "UserIs")]
    pub user_type: i32,
    #[serde(rename = "UserIsLabel", skip_serializing_if = "Option::is_none")]
    pub user_type_label: Option<String>,
    #[serde(rename = "CreatedAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            cellphone: user.cellphone.clone(),
            favorite_app: user.favorite_app,
            favorite_app_label: FavoriteApp::from_code(user.favorite_app as i64)
                .map(|a| a.label().to_string()),
            user_type: user.user_type,
            user_type_label: UserType::from_code(user.user_type as i64)
                .map(|t| t.label().to_string()),
            created_at: user
                .created_at
                .and_then(|dt| dt.try_to_rfc3339_string().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            email: "ana@triap.com.br".to_string(),
            cellphone: "11999990000".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            favorite_app: FavoriteApp::Uber,
            user_type: UserType::Driver,
        }
    }

    #[test]
    fn test_codes() {
        assert_eq!(FavoriteApp::from_code(1), Some(FavoriteApp::NinetyNine));
        assert_eq!(FavoriteApp::from_code(3), None);
        assert_eq!(UserType::from_code(3), Some(UserType::Company));
        assert_eq!(UserType::from_code(0), None);
    }

    #[test]
    fn test_profile_hides_password() {
        let user = sample().into_user("abc123".to_string());
        let profile = UserProfile::from(&user);
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["UserId"], "abc123");
        assert_eq!(json["UserFavoriteApp"], 2);
        assert_eq!(json["UserFavoriteAppLabel"], "Uber");
        assert_eq!(json["UserIsLabel"], "driver");
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("$2b$"));
    }
}
