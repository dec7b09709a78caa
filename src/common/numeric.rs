// src/common/numeric.rs
//
// Os dois backends não concordam sobre como um número chega até nós: o
// Postgres devolve numéricos de verdade, a API legada (PHP/MySQL) serializa
// como string, e usuários digitam decimais com vírgula ("12,5"). Tudo
// converge para f64 aqui, antes de qualquer aritmética de saldo.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Coage uma representação numérica heterogênea para um f64 finito.
///
/// Números finitos passam direto; strings são aparadas, têm a vírgula
/// decimal trocada por ponto e são parseadas; nulo vira o `fallback`.
/// O default silencioso para `fallback` é intencional e restrito a
/// quantidades: evita propagar NaN para a interface.
pub fn normalize(raw: &Value, fallback: f64) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().map_or(fallback, |v| normalize_f64(v, fallback)),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', ".");
            match cleaned.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => fallback,
            }
        }
        Value::Null => fallback,
        // Coerção numérica para os tipos restantes, no espírito do JS.
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => fallback,
    }
}

/// Garante que um f64 já desserializado é finito.
pub fn normalize_f64(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Helper de serde para campos de quantidade que aceitam número ou string.
pub fn flexible_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize(&raw, 0.0))
}

/// Como `flexible_quantity`, mas nulo/ausente significa "sem valor",
/// não zero (usado em `min_quantity`).
pub fn flexible_quantity_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    Ok(Some(normalize(&raw, 0.0)))
}

/// Preços também chegam como string da API legada, mas dinheiro não tem
/// fallback silencioso: valor imprestável é erro de desserialização.
pub fn flexible_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let parsed = match &raw {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(&s.trim().replace(',', ".")).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        serde::de::Error::custom(format!("valor monetário inválido: {raw}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finite_numbers_pass_through() {
        assert_eq!(normalize(&json!(12.5), 0.0), 12.5);
        assert_eq!(normalize(&json!(0), 0.0), 0.0);
        assert_eq!(normalize(&json!(-3.0), 0.0), -3.0);
    }

    #[test]
    fn comma_decimal_strings_are_parsed() {
        assert_eq!(normalize(&json!("12,5"), 0.0), 12.5);
        assert_eq!(normalize(&json!(" 7.25 "), 0.0), 7.25);
        assert_eq!(normalize(&json!("100"), 0.0), 100.0);
    }

    #[test]
    fn unparseable_input_falls_back() {
        assert_eq!(normalize(&json!("abc"), 0.0), 0.0);
        assert_eq!(normalize(&json!(""), 0.0), 0.0);
        assert_eq!(normalize(&json!("NaN"), 0.0), 0.0);
        assert_eq!(normalize(&json!("inf"), 0.0), 0.0);
        assert_eq!(normalize(&json!([1, 2]), 0.0), 0.0);
    }

    #[test]
    fn null_uses_fallback() {
        assert_eq!(normalize(&Value::Null, 0.0), 0.0);
        assert_eq!(normalize(&Value::Null, 3.0), 3.0);
    }

    #[test]
    fn booleans_coerce_like_javascript() {
        assert_eq!(normalize(&json!(true), 0.0), 1.0);
        assert_eq!(normalize(&json!(false), 9.0), 0.0);
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            json!(12.5),
            json!("12,5"),
            json!("abc"),
            Value::Null,
            json!(true),
            json!(-8),
        ];
        for raw in inputs {
            let once = normalize(&raw, 0.0);
            let twice = normalize(&json!(once), 0.0);
            assert_eq!(once, twice, "entrada: {raw}");
        }
    }

    #[test]
    fn flexible_decimal_accepts_legacy_strings() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "flexible_decimal")]
            price: Decimal,
        }

        let from_string: Wrapper = serde_json::from_value(json!({ "price": "12,50" })).unwrap();
        assert_eq!(from_string.price, Decimal::from_str("12.50").unwrap());

        let from_number: Wrapper = serde_json::from_value(json!({ "price": 8.9 })).unwrap();
        assert_eq!(from_number.price, Decimal::from_str("8.9").unwrap());

        assert!(serde_json::from_value::<Wrapper>(json!({ "price": "caro" })).is_err());
    }

    #[test]
    fn flexible_quantity_opt_keeps_null_as_none() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default, deserialize_with = "flexible_quantity_opt")]
            min: Option<f64>,
        }

        let missing: Wrapper = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.min, None);

        let null: Wrapper = serde_json::from_value(json!({ "min": null })).unwrap();
        assert_eq!(null.min, None);

        let set: Wrapper = serde_json::from_value(json!({ "min": "2,5" })).unwrap();
        assert_eq!(set.min, Some(2.5));
    }
}
