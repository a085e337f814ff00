use serde::{Deserialize, Deserializer, Serialize};

/// ユーザーの権限。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
}

/// ログインユーザー、またはチームメンバー。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub manager_id: Option<String>,
    /// マネージャーの場合のみ設定される。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_members: Vec<User>,
}

impl User {
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    /// チームメンバーを返す。マネージャー以外は常に空とする。
    pub fn team(&self) -> &[User] {
        if self.is_manager() {
            &self.team_members
        } else {
            &[]
        }
    }

    /// 指定したidのチームメンバーを探す。
    pub fn find_member(&self, id: &str) -> Option<&User> {
        self.team().iter().find(|member| member.id == id)
    }

    /// マネージャー自身とチームメンバーのidであれば`true`を返す。
    pub fn is_in_team(&self, user_id: &str) -> bool {
        self.is_manager() && (self.id == user_id || self.find_member(user_id).is_some())
    }
}

/// APIのidは文字列と数値のどちらでも返ってくるため、文字列に揃える。
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: format!("user{}", id),
            email: format!("user{}@example.com", id),
            role,
            manager_id: None,
            team_members: vec![],
        }
    }

    #[test]
    fn test_team_of_manager() {
        let mut manager = user("1", Role::Manager);
        manager.team_members = vec![user("2", Role::Employee), user("3", Role::Employee)];

        assert_eq!(manager.team().len(), 2);
        assert!(manager.is_in_team("1"));
        assert!(manager.is_in_team("3"));
        assert!(!manager.is_in_team("4"));
        assert_eq!(manager.find_member("2").map(|m| m.name.as_str()), Some("user2"));
    }

    /// 従業員がチームメンバーを保持していても参照できないことを確認する。
    #[test]
    fn test_team_of_employee_is_empty() {
        let mut employee = user("2", Role::Employee);
        employee.team_members = vec![user("3", Role::Employee)];

        assert!(employee.team().is_empty());
        assert!(!employee.is_in_team("2"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": "1",
            "name": "John Doe",
            "email": "john@example.com",
            "role": "manager",
            "teamMembers": [
                {"id": "2", "name": "Jane Smith", "email": "jane@example.com", "role": "employee", "managerId": "1"}
            ]
        }"#;

        let manager: User = serde_json::from_str(json).unwrap();

        assert!(manager.is_manager());
        assert_eq!(manager.team_members[0].manager_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_deserialize_numeric_ids() {
        let json = r#"{"id": 5, "name": "Regular User", "email": "user@example.com", "role": "employee", "managerId": 1}"#;

        let employee: User = serde_json::from_str(json).unwrap();

        assert_eq!(employee.id, "5");
        assert_eq!(employee.manager_id.as_deref(), Some("1"));
        assert!(employee.team_members.is_empty());
    }
}
