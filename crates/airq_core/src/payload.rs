//! Codificação do payload de telemetria.
//!
//! Gera o registro JSON textual publicado no broker, com ordem de campos
//! fixa e formatação determinística:
//!
//! ```text
//! {"temperature":24.6,"humidity":58.1,"mq135":412,
//!  "eco2":400,"tvoc":12,"pm25":8.0,"pm10":15.0}
//! ```
//!
//! - Floats com exatamente uma casa decimal; inteiros sem formatação
//! - Clima indisponível vira `null` (o firmware antigo emitia `nan`, que
//!   não é JSON válido)
//! - Canais de gás/particulado indisponíveis mantêm o sentinela de fio
//!   original: `0` / `0.0`

use crate::types::SensorSnapshot;
use std::fmt::Write;

/// Codifica um [`SensorSnapshot`] no registro JSON publicado via MQTT.
///
/// Função pura e total: todo snapshot produz exatamente uma saída, com as
/// sete chaves sempre presentes, na mesma ordem.
pub fn encode_payload(snapshot: &SensorSnapshot) -> String {
    let mut out = String::with_capacity(128);
    out.push('{');

    push_float(&mut out, "temperature", snapshot.temperature, Sentinel::Null);
    out.push(',');
    push_float(&mut out, "humidity", snapshot.humidity, Sentinel::Null);
    out.push(',');

    let _ = write!(out, "\"mq135\":{}", snapshot.gas_raw);
    out.push(',');
    let _ = write!(out, "\"eco2\":{}", snapshot.eco2.unwrap_or(0));
    out.push(',');
    let _ = write!(out, "\"tvoc\":{}", snapshot.tvoc.unwrap_or(0));
    out.push(',');

    push_float(&mut out, "pm25", snapshot.pm25, Sentinel::Zero);
    out.push(',');
    push_float(&mut out, "pm10", snapshot.pm10, Sentinel::Zero);

    out.push('}');
    out
}

/// Representação de um canal float sem leitura válida.
#[derive(Clone, Copy)]
enum Sentinel {
    /// `null` – canais de clima
    Null,
    /// `0.0` – canais de particulado (sentinela de fio original)
    Zero,
}

fn push_float(out: &mut String, key: &str, value: Option<f32>, sentinel: Sentinel) {
    match value {
        // NaN/inf nunca chegam ao fio
        Some(v) if v.is_finite() => {
            let _ = write!(out, "\"{key}\":{v:.1}");
        }
        _ => {
            let _ = match sentinel {
                Sentinel::Null => write!(out, "\"{key}\":null"),
                Sentinel::Zero => write!(out, "\"{key}\":0.0"),
            };
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn full_snapshot() -> SensorSnapshot {
        SensorSnapshot {
            temperature: Some(24.63),
            humidity: Some(58.08),
            gas_raw: 412,
            eco2: Some(400),
            tvoc: Some(12),
            pm25: Some(8.0),
            pm10: Some(15.0),
        }
    }

    #[test]
    fn encodes_full_snapshot() {
        let json = encode_payload(&full_snapshot());
        assert_eq!(
            json,
            "{\"temperature\":24.6,\"humidity\":58.1,\"mq135\":412,\
             \"eco2\":400,\"tvoc\":12,\"pm25\":8.0,\"pm10\":15.0}"
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let snapshot = full_snapshot();
        assert_eq!(encode_payload(&snapshot), encode_payload(&snapshot));
    }

    #[test]
    fn field_order_is_fixed() {
        let json = encode_payload(&SensorSnapshot::default());
        let keys = ["temperature", "humidity", "mq135", "eco2", "tvoc", "pm25", "pm10"];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(&format!("\"{k}\"")).expect("chave ausente"))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn all_sentinel_snapshot_keeps_all_keys() {
        let json = encode_payload(&SensorSnapshot::default());
        assert_eq!(
            json,
            "{\"temperature\":null,\"humidity\":null,\"mq135\":0,\
             \"eco2\":0,\"tvoc\":0,\"pm25\":0.0,\"pm10\":0.0}"
        );
    }

    #[test]
    fn missing_climate_renders_null() {
        let snapshot = SensorSnapshot {
            humidity: Some(60.0),
            ..full_snapshot()
        };
        let snapshot = SensorSnapshot {
            temperature: None,
            ..snapshot
        };
        let json = encode_payload(&snapshot);
        assert!(json.contains("\"temperature\":null"));
        assert!(json.contains("\"humidity\":60.0"));
    }

    #[test]
    fn non_finite_float_renders_null() {
        // NaN contrabandeado em Some nunca vaza para o fio
        let snapshot = SensorSnapshot {
            temperature: Some(f32::NAN),
            ..full_snapshot()
        };
        let json = encode_payload(&snapshot);
        assert!(json.contains("\"temperature\":null"));
    }

    #[test]
    fn one_decimal_rounding() {
        let snapshot = SensorSnapshot {
            temperature: Some(19.96),
            humidity: Some(0.04),
            ..Default::default()
        };
        let json = encode_payload(&snapshot);
        assert!(json.contains("\"temperature\":20.0"));
        assert!(json.contains("\"humidity\":0.0"));
    }

    #[test]
    fn output_is_valid_json() {
        for snapshot in [full_snapshot(), SensorSnapshot::default()] {
            let json = encode_payload(&snapshot);
            let parsed: serde_json::Value =
                serde_json::from_str(&json).expect("payload deve ser JSON válido");
            assert!(parsed.is_object());
            assert_eq!(parsed.as_object().unwrap().len(), 7);
        }
    }
}
