use std::collections::{BTreeSet, HashMap};
use std::fmt;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::api::LeagueApi;
use crate::reporter;
use crate::types::{LadderEntry, Team, TeamUser};

/// Ascendancy-free classes every team may play.
pub const BASE_CLASSES: [&str; 7] = [
    "Scion", "Marauder", "Ranger", "Shadow", "Templar", "Witch", "Duelist",
];

/// A ladder character that breaks a team naming or class rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Character name lacks the team's short code.
    TeamTag {
        character_name: String,
        level: u32,
        team_short: String,
    },
    /// Character plays an ascendancy its team is not allowed.
    Ascendancy {
        character_name: String,
        ascendancy: String,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::TeamTag {
                character_name,
                team_short,
                ..
            } => write!(
                f,
                "Mismatch: {character_name} should have team name {team_short}"
            ),
            Mismatch::Ascendancy {
                character_name,
                ascendancy,
            } => write!(
                f,
                "Mismatch: {character_name} has an invalid ascendancy: {ascendancy}"
            ),
        }
    }
}

/// Flatten the users-by-team response into user id -> team id.
pub fn build_user_team_map(
    users_by_team: &HashMap<String, Vec<TeamUser>>,
) -> Result<HashMap<i64, i64>> {
    let mut map = HashMap::new();
    for (team_id, users) in users_by_team {
        let team_id: i64 = team_id
            .trim()
            .parse()
            .with_context(|| format!("team id {team_id:?} is not a number"))?;
        for user in users {
            map.insert(user.id, team_id);
        }
    }
    Ok(map)
}

/// Short code per team: configured codes first, else the first three
/// characters of the team name.
pub fn team_short_codes(teams: &[Team], configured: &HashMap<i64, String>) -> HashMap<i64, String> {
    let mut shorts: HashMap<i64, String> = teams
        .iter()
        .filter(|t| !t.name.trim().is_empty())
        .map(|t| (t.id, t.name.trim().chars().take(3).collect()))
        .collect();
    shorts.extend(configured.iter().map(|(id, s)| (*id, s.clone())));
    shorts
}

/// Everything the comparison needs besides the ladder itself.
#[derive(Debug, Clone, Default)]
pub struct NameRules {
    pub user_teams: HashMap<i64, i64>,
    pub team_shorts: HashMap<i64, String>,
    /// Allowed ascendancies, only for teams the teams endpoint returned.
    pub allowed_classes: HashMap<i64, Vec<String>>,
    pub min_level: u32,
}

impl NameRules {
    pub fn new(
        user_teams: HashMap<i64, i64>,
        teams: &[Team],
        configured_shorts: &HashMap<i64, String>,
        min_level: u32,
    ) -> Self {
        Self {
            user_teams,
            team_shorts: team_short_codes(teams, configured_shorts),
            allowed_classes: teams
                .iter()
                .map(|t| (t.id, t.allowed_classes.clone()))
                .collect(),
            min_level,
        }
    }
}

fn ascendancy_allowed(ascendancy: &str, allowed: &[String]) -> bool {
    BASE_CLASSES.contains(&ascendancy) || allowed.iter().any(|a| a == ascendancy)
}

/// Compare ladder entries against their team's rules.
///
/// Entries of users without a team are ignored. At most one `TeamTag` and one
/// `Ascendancy` mismatch are produced per entry.
pub fn find_mismatches(ladder: &[LadderEntry], rules: &NameRules) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    let mut teams_without_short = BTreeSet::new();

    for entry in ladder {
        let Some(team_id) = rules.user_teams.get(&entry.user_id) else {
            continue;
        };

        match rules.team_shorts.get(team_id) {
            Some(short) => {
                let tagged = entry
                    .character_name
                    .to_lowercase()
                    .contains(&short.to_lowercase());
                if !tagged && entry.level >= rules.min_level {
                    mismatches.push(Mismatch::TeamTag {
                        character_name: entry.character_name.clone(),
                        level: entry.level,
                        team_short: short.clone(),
                    });
                }
            }
            None => {
                teams_without_short.insert(*team_id);
            }
        }

        let ascendancy = entry
            .character
            .as_ref()
            .map(|c| c.ascendancy.as_str())
            .filter(|a| !a.is_empty());
        if let (Some(ascendancy), Some(allowed)) = (ascendancy, rules.allowed_classes.get(team_id))
            && !ascendancy_allowed(ascendancy, allowed)
        {
            mismatches.push(Mismatch::Ascendancy {
                character_name: entry.character_name.clone(),
                ascendancy: ascendancy.to_string(),
            });
        }
    }

    for team_id in teams_without_short {
        warn!("No short code known for team {team_id}, skipping its name check");
    }
    mismatches
}

/// One checker cycle: fetch roster, teams and ladder, then print every mismatch.
pub async fn check_names(
    league: &dyn LeagueApi,
    configured_shorts: &HashMap<i64, String>,
    min_level: u32,
) -> Result<Vec<Mismatch>> {
    let users = league
        .users_by_team()
        .await
        .context("failed to get users")?;
    let user_teams = build_user_team_map(&users)?;
    let teams = league.teams().await.context("failed to get teams")?;
    let ladder = league.ladder().await.context("failed to get ladder")?;
    debug!(
        "Checking {} ladder entries against {} team members",
        ladder.len(),
        user_teams.len()
    );

    let rules = NameRules::new(user_teams, &teams, configured_shorts, min_level);
    let mismatches = find_mismatches(&ladder, &rules);
    reporter::report_mismatches(&mismatches);
    Ok(mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Character, Event, Signup};
    use async_trait::async_trait;
    use serde_json::json;

    fn entry(user_id: i64, name: &str, level: u32, ascendancy: Option<&str>) -> LadderEntry {
        LadderEntry {
            user_id,
            character_name: name.to_string(),
            level,
            character: ascendancy.map(|a| Character {
                ascendancy: a.to_string(),
            }),
        }
    }

    fn team(id: i64, name: &str, allowed: &[&str]) -> Team {
        Team {
            id,
            name: name.to_string(),
            allowed_classes: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn default_shorts() -> HashMap<i64, String> {
        HashMap::from([
            (18, "BAS".to_string()),
            (19, "DEA".to_string()),
            (20, "SNI".to_string()),
        ])
    }

    fn users_fixture() -> HashMap<String, Vec<TeamUser>> {
        serde_json::from_value(json!({
            "18": [{ "id": 1 }, { "id": 2 }],
            "19": [{ "id": 3 }],
            "20": [{ "id": 4 }],
        }))
        .unwrap()
    }

    #[test]
    fn user_team_map_flattens_teams() {
        let map = build_user_team_map(&users_fixture()).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map[&1], 18);
        assert_eq!(map[&3], 19);
    }

    #[test]
    fn user_team_map_rejects_non_numeric_team() {
        let users = HashMap::from([("bastion".to_string(), vec![TeamUser { id: 1 }])]);
        assert!(build_user_team_map(&users).is_err());
    }

    #[test]
    fn short_codes_prefer_configured_over_team_name() {
        let teams = [team(18, "Bastion", &[]), team(21, "Order", &[])];
        let shorts = team_short_codes(&teams, &HashMap::from([(18, "BST".to_string())]));
        assert_eq!(shorts[&18], "BST");
        assert_eq!(shorts[&21], "Ord");
    }

    #[test]
    fn one_mismatch_per_untagged_character() {
        let rules = NameRules::new(
            build_user_team_map(&users_fixture()).unwrap(),
            &[],
            &default_shorts(),
            0,
        );
        let ladder = [
            entry(1, "BAS_Slammer", 90, None),
            entry(2, "Slammer", 90, None),
            entry(3, "deadeye_dea", 80, None),
            entry(4, "SnIper", 70, None),
            entry(5, "NoTeamAtAll", 95, None),
        ];
        let mismatches = find_mismatches(&ladder, &rules);
        assert_eq!(
            mismatches,
            vec![Mismatch::TeamTag {
                character_name: "Slammer".into(),
                level: 90,
                team_short: "BAS".into(),
            }]
        );
        assert_eq!(
            mismatches[0].to_string(),
            "Mismatch: Slammer should have team name BAS"
        );
    }

    #[test]
    fn min_level_exempts_low_characters() {
        let rules = NameRules::new(
            HashMap::from([(1, 18)]),
            &[],
            &default_shorts(),
            10,
        );
        let ladder = [entry(1, "Fresh", 9, None), entry(1, "Grown", 10, None)];
        let mismatches = find_mismatches(&ladder, &rules);
        assert_eq!(mismatches.len(), 1);
        assert!(matches!(&mismatches[0], Mismatch::TeamTag { character_name, .. } if character_name == "Grown"));
    }

    #[test]
    fn team_without_short_code_is_skipped() {
        let rules = NameRules::new(HashMap::from([(1, 99)]), &[], &default_shorts(), 0);
        assert!(find_mismatches(&[entry(1, "Anything", 50, None)], &rules).is_empty());
    }

    #[test]
    fn ascendancy_must_be_base_or_allowed() {
        let teams = [team(18, "Bastion", &["Juggernaut", "Chieftain"])];
        let rules = NameRules::new(HashMap::from([(1, 18)]), &teams, &default_shorts(), 0);
        let ladder = [
            entry(1, "BAS_Jugg", 90, Some("Juggernaut")),
            entry(1, "BAS_Scion", 2, Some("Scion")),
            entry(1, "BAS_Sneaky", 90, Some("Assassin")),
            entry(1, "BAS_Fresh", 1, Some("")),
        ];
        let mismatches = find_mismatches(&ladder, &rules);
        assert_eq!(
            mismatches,
            vec![Mismatch::Ascendancy {
                character_name: "BAS_Sneaky".into(),
                ascendancy: "Assassin".into(),
            }]
        );
    }

    struct FixtureLeague {
        ladder: Vec<LadderEntry>,
        users: HashMap<String, Vec<TeamUser>>,
        teams: Vec<Team>,
    }

    #[async_trait]
    impl LeagueApi for FixtureLeague {
        async fn current_event(&self) -> Result<Event> {
            anyhow::bail!("not used")
        }
        async fn ladder(&self) -> Result<Vec<LadderEntry>> {
            Ok(self.ladder.clone())
        }
        async fn users_by_team(&self) -> Result<HashMap<String, Vec<TeamUser>>> {
            Ok(self.users.clone())
        }
        async fn teams(&self) -> Result<Vec<Team>> {
            Ok(self.teams.clone())
        }
        async fn signups(&self) -> Result<Vec<Signup>> {
            anyhow::bail!("not used")
        }
    }

    #[tokio::test]
    async fn check_names_reports_deliberate_mismatch() {
        let league = FixtureLeague {
            ladder: vec![
                entry(1, "bas_ok", 50, Some("Marauder")),
                entry(3, "WrongTag", 50, Some("Deadeye")),
            ],
            users: users_fixture(),
            teams: vec![team(19, "Deadly", &["Deadeye"])],
        };
        let mismatches = check_names(&league, &default_shorts(), 0).await.unwrap();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(
            mismatches[0].to_string(),
            "Mismatch: WrongTag should have team name DEA"
        );
    }
}
