use serde::{Deserialize, Serialize};

/// Role the vendor API assigns to a pending join request.
pub const ROLE_REQUESTED_INVITE: &str = "requested_invite";

/// One row of the current event ladder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LadderEntry {
    pub user_id: i64,
    pub character_name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub character: Option<Character>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub ascendancy: String,
}

/// A user as listed under its team in `/events/current/users`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamUser {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub allowed_classes: Vec<String>,
}

/// Current league event. The name embeds the private league id, e.g. `"BPL 7 (PL12345)"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Event {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Signup {
    pub user: SignupUser,
    #[serde(default)]
    pub team_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupUser {
    pub account_name: String,
}

/// Private league member entry from the vendor API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub member_name: String,
    pub role: String,
    #[serde(default)]
    pub is_acceptable: bool,
}

impl Member {
    pub fn is_join_request(&self) -> bool {
        self.role == ROLE_REQUESTED_INVITE
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembersResponse {
    pub members: Vec<Member>,
}

/// Single entry of the accept-invites POST body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptAction {
    pub name: &'static str,
    pub value: i64,
}

impl AcceptAction {
    pub fn accept(member: &Member) -> Self {
        Self {
            name: "accept",
            value: member.id,
        }
    }
}

/// Raw outcome of the accept-invites POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptResponse {
    pub status: u16,
    pub body: String,
}

impl AcceptResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ladder_entry_tolerates_missing_optional_fields() {
        let entry: LadderEntry = serde_json::from_value(json!({
            "user_id": 7,
            "character_name": "BAS_Slammer",
        }))
        .unwrap();
        assert_eq!(entry.level, 0);
        assert!(entry.character.is_none());
    }

    #[test]
    fn member_uses_camel_case_fields() {
        let member: Member = serde_json::from_value(json!({
            "id": 42,
            "memberName": "Alice#1234",
            "role": "requested_invite",
            "isAcceptable": true,
        }))
        .unwrap();
        assert_eq!(member.member_name, "Alice#1234");
        assert!(member.is_acceptable);
        assert!(member.is_join_request());
    }

    #[test]
    fn accept_action_serializes_as_name_value_pair() {
        let member = Member {
            id: 9,
            member_name: "Bob".into(),
            role: ROLE_REQUESTED_INVITE.into(),
            is_acceptable: true,
        };
        let body = serde_json::to_value(vec![AcceptAction::accept(&member)]).unwrap();
        assert_eq!(body, json!([{ "name": "accept", "value": 9 }]));
    }

    #[test]
    fn member_list_without_members_key_is_an_error() {
        let parsed = serde_json::from_value::<MembersResponse>(json!({
            "error": { "code": 6, "message": "Forbidden" },
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn empty_member_list_is_accepted() {
        let parsed: MembersResponse = serde_json::from_value(json!({ "members": [] })).unwrap();
        assert!(parsed.members.is_empty());
    }

    #[test]
    fn signup_with_null_team() {
        let signup: Signup = serde_json::from_value(json!({
            "user": { "account_name": "Carol" },
            "team_id": null,
        }))
        .unwrap();
        assert_eq!(signup.team_id, None);
    }
}
