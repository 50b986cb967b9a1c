//! Definição do snapshot de leituras da estação.
//!
//! Um [`SensorSnapshot`] é produzido uma vez por ciclo pelo leitor de
//! sensores e consumido imediatamente pelo encoder de payload – nunca é
//! retido entre ciclos.
//!
//! Canais degradáveis usam `Option`: `None` significa "sem leitura válida
//! neste ciclo". O sentinela de fio (0 / null) é aplicado apenas na hora
//! de codificar o payload, em um único lugar.

// ──────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────

/// Conjunto completo e consistente de leituras de um ciclo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Temperatura do DHT22 (°C)
    pub temperature: Option<f32>,
    /// Umidade relativa do DHT22 (%)
    pub humidity: Option<f32>,
    /// Leitura analógica bruta do MQ-135 (sempre presente)
    pub gas_raw: i32,
    /// CO2 equivalente do CCS811 (ppm)
    pub eco2: Option<u16>,
    /// VOC total do CCS811 (ppb)
    pub tvoc: Option<u16>,
    /// Material particulado PM2.5 do PMS5003 (µg/m³)
    pub pm25: Option<f32>,
    /// Material particulado PM10 do PMS5003 (µg/m³)
    pub pm10: Option<f32>,
}

/// Par eCO2/TVOC retornado pelo CCS811 em uma leitura bem-sucedida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQuality {
    /// CO2 equivalente (ppm)
    pub eco2: u16,
    /// VOC total (ppb)
    pub tvoc: u16,
}

/// Par PM2.5/PM10 extraído de um frame válido do PMS5003.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticulateReading {
    /// Concentração PM2.5 (µg/m³)
    pub pm25: f32,
    /// Concentração PM10 (µg/m³)
    pub pm10: f32,
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_has_no_readings() {
        let s = SensorSnapshot::default();
        assert_eq!(s.temperature, None);
        assert_eq!(s.humidity, None);
        assert_eq!(s.gas_raw, 0);
        assert_eq!(s.eco2, None);
        assert_eq!(s.tvoc, None);
        assert_eq!(s.pm25, None);
        assert_eq!(s.pm10, None);
    }

    #[test]
    fn none_is_distinct_from_zero() {
        // Zero legítimo (ar muito limpo) não é o mesmo que "sem leitura"
        let clean = SensorSnapshot {
            pm25: Some(0.0),
            ..Default::default()
        };
        let missing = SensorSnapshot::default();
        assert_ne!(clean, missing);
    }
}
