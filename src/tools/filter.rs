use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

/// League entry emitted by [`filter_leagues`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeagueSummary {
    pub id: Value,
    pub name: Value,
    pub country: Value,
}

/// Flattened live match emitted by [`filter_livescores`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LiveMatch {
    pub id: Value,
    pub league_id: Value,
    pub league_name: Value,
    pub stage_id: Value,
    pub stage_name: Value,
    pub home_team_id: Value,
    pub home_team: Value,
    pub away_team_id: Value,
    pub away_team: Value,
    pub status: Value,
    pub date: Value,
    pub time: Value,
}

fn name_matches(name: Option<&str>, needle: &str) -> bool {
    name.unwrap_or_default().to_lowercase().contains(needle)
}

fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

fn as_array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn render<T: Serialize>(results: &[T]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "count": results.len(),
        "results": results,
    }))
}

/// Keep leagues whose `name` contains `query`, case-insensitively.
///
/// A body without a `results` array is returned unchanged.
pub fn filter_leagues(response: &str, query: &str) -> String {
    let data: Value = match serde_json::from_str(response) {
        Ok(data) => data,
        Err(e) => return format!("Error processing leagues: {}", e),
    };
    let Some(leagues) = data.get("results").and_then(Value::as_array) else {
        return response.to_string();
    };

    let needle = query.to_lowercase();
    let results: Vec<LeagueSummary> = leagues
        .iter()
        .filter(|league| name_matches(league.get("name").and_then(Value::as_str), &needle))
        .map(|league| LeagueSummary {
            id: field(league, "id"),
            name: field(league, "name"),
            country: league
                .get("country")
                .map(|country| field(country, "name"))
                .unwrap_or(Value::Null),
        })
        .collect();

    render(&results).unwrap_or_else(|e| format!("Error processing leagues: {}", e))
}

/// Flatten live matches of leagues whose `league_name` contains `query`.
///
/// A body without a `results` array is returned unchanged.
pub fn filter_livescores(response: &str, query: &str) -> String {
    let data: Value = match serde_json::from_str(response) {
        Ok(data) => data,
        Err(e) => return format!("Error processing matches: {}", e),
    };
    let Some(leagues) = data.get("results").and_then(Value::as_array) else {
        return response.to_string();
    };

    let needle = query.to_lowercase();
    let mut results = Vec::new();

    for league in leagues {
        if !name_matches(league.get("league_name").and_then(Value::as_str), &needle) {
            continue;
        }

        for stage in as_array(league, "stage") {
            for game in as_array(stage, "matches") {
                if !game.is_object() {
                    warn!("Skipping malformed match entry: {}", game);
                    continue;
                }

                let teams = game.get("teams").cloned().unwrap_or(Value::Null);
                let home = teams.get("home").cloned().unwrap_or(Value::Null);
                let away = teams.get("away").cloned().unwrap_or(Value::Null);

                results.push(LiveMatch {
                    id: field(game, "id"),
                    league_id: field(league, "league_id"),
                    league_name: field(league, "league_name"),
                    stage_id: field(stage, "stage_id"),
                    stage_name: field(stage, "stage_name"),
                    home_team_id: field(&home, "id"),
                    home_team: field(&home, "name"),
                    away_team_id: field(&away, "id"),
                    away_team: field(&away, "name"),
                    status: field(game, "status"),
                    date: field(game, "date"),
                    time: field(game, "time"),
                });
            }
        }
    }

    render(&results).unwrap_or_else(|e| format!("Error processing matches: {}", e))
}
