//! Deserializers for the PHP API, which sends numbers as JSON numbers or as
//! strings depending on the driver, and `null` where a count is zero.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl NumberLike {
    fn as_f64(&self) -> f64 {
        match self {
            NumberLike::Int(v) => *v as f64,
            NumberLike::Float(v) => *v,
            NumberLike::Text(s) => s.trim().parse().unwrap_or(0.0),
            NumberLike::Bool(b) => u8::from(*b) as f64,
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            NumberLike::Int(v) => *v,
            NumberLike::Float(v) => *v as i64,
            NumberLike::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                    .unwrap_or(0)
            }
            NumberLike::Bool(b) => i64::from(*b),
        }
    }
}

pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberLike> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| v.as_i64()).unwrap_or(0))
}

pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberLike> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| v.as_f64()).unwrap_or(0.0))
}

pub fn opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberLike> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| v.as_f64()))
}

/// Ids arrive as numbers or numeric strings; keep them as text.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberLike> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberLike::Int(v)) => v.to_string(),
        Some(NumberLike::Float(v)) => v.to_string(),
        Some(NumberLike::Text(s)) => s,
        Some(NumberLike::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::int")]
        count: i64,
        #[serde(default, deserialize_with = "super::float")]
        latency: f64,
        #[serde(default, deserialize_with = "super::id_string")]
        id: String,
    }

    #[test]
    fn accepts_numbers_strings_and_nulls() {
        let row: Row = serde_json::from_str(r#"{"count":"12","latency":"3.5","id":7}"#).unwrap();
        assert_eq!(row.count, 12);
        assert_eq!(row.latency, 3.5);
        assert_eq!(row.id, "7");

        let row: Row = serde_json::from_str(r#"{"count":null,"latency":2}"#).unwrap();
        assert_eq!(row.count, 0);
        assert_eq!(row.latency, 2.0);
        assert_eq!(row.id, "");
    }
}
