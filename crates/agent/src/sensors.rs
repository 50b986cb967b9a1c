//! Leitura dos sensores da estação com política de degradação por canal.
//!
//! Cada sensor físico é consumido através de um handle de capability
//! injetado na construção – em produção os handles falam com o iio sysfs
//! e com a porta serial ([`crate::hw`]); nos testes são fakes.
//!
//! `read_all` é uma função total: falha de sensor nunca propaga, o canal
//! degrada para `None` e vira uma linha de diagnóstico no log.

use airq_core::frame::{parse_frame, FRAME_LEN};
use airq_core::types::{AirQuality, SensorSnapshot};
use tracing::{debug, warn};

// ──────────────────────────────────────────────
// Capabilities de sensor
// ──────────────────────────────────────────────

/// Sensor combinado de temperatura/umidade (DHT22).
///
/// Leituras inválidas retornam NaN, como o sensor físico.
pub trait ClimateSensor {
    fn read_temperature(&mut self) -> f32;
    fn read_humidity(&mut self) -> f32;
}

/// Canal analógico de resistência de gás (MQ-135).
///
/// Uma amostra síncrona; não existe verificação de validade nesta camada.
pub trait GasSensor {
    fn sample(&mut self) -> i32;
}

/// Sensor de eCO2/TVOC (CCS811).
pub trait AirQualitySensor {
    /// Indica se o sensor tem uma medição pronta neste ciclo.
    fn data_available(&mut self) -> bool;
    /// Lê a medição corrente; `Err` carrega o motivo para o log.
    fn read(&mut self) -> Result<AirQuality, String>;
}

/// Fonte de bytes da serial do PMS5003.
pub trait ByteSource {
    /// Quantidade de bytes prontos para leitura.
    fn available(&mut self) -> usize;
    /// Lê exatamente `buf.len()` bytes.
    fn read_exact(&mut self, buf: &mut [u8]) -> std::io::Result<()>;
}

// ──────────────────────────────────────────────
// SensorReader
// ──────────────────────────────────────────────

/// Leitor dos quatro canais da estação.
pub struct SensorReader {
    climate: Box<dyn ClimateSensor>,
    gas: Box<dyn GasSensor>,
    airq: Box<dyn AirQualitySensor>,
    particulate: Box<dyn ByteSource>,
}

impl SensorReader {
    pub fn new(
        climate: impl ClimateSensor + 'static,
        gas: impl GasSensor + 'static,
        airq: impl AirQualitySensor + 'static,
        particulate: impl ByteSource + 'static,
    ) -> Self {
        Self {
            climate: Box::new(climate),
            gas: Box::new(gas),
            airq: Box::new(airq),
            particulate: Box::new(particulate),
        }
    }

    /// Lê todos os canais e monta o snapshot do ciclo.
    ///
    /// Nunca falha: cada canal degrada independentemente para o estado
    /// "sem leitura" em vez de propagar erro.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::default();

        // ── DHT22 ──
        let temperature = self.climate.read_temperature();
        let humidity = self.climate.read_humidity();
        if temperature.is_nan() || humidity.is_nan() {
            warn!("Leitura do DHT22 falhou – verifique a fiação");
        }
        snapshot.temperature = finite(temperature);
        snapshot.humidity = finite(humidity);

        // ── MQ-135 ──
        snapshot.gas_raw = self.gas.sample();

        // ── CCS811 ──
        if self.airq.data_available() {
            match self.airq.read() {
                Ok(AirQuality { eco2, tvoc }) => {
                    snapshot.eco2 = Some(eco2);
                    snapshot.tvoc = Some(tvoc);
                }
                Err(e) => warn!("Erro ao ler CCS811: {e}"),
            }
        } else {
            debug!("CCS811 sem medição pronta neste ciclo");
        }

        // ── PMS5003 ──
        if self.particulate.available() > 0 {
            let mut buf = [0u8; FRAME_LEN];
            match self.particulate.read_exact(&mut buf) {
                Ok(()) => match parse_frame(&buf) {
                    Ok(reading) => {
                        snapshot.pm25 = Some(reading.pm25);
                        snapshot.pm10 = Some(reading.pm10);
                    }
                    Err(e) => warn!("Frame inválido do PMS5003: {e}"),
                },
                Err(e) => warn!("Erro ao ler serial do PMS5003: {e}"),
            }
        } else {
            debug!("PMS5003 sem bytes na serial neste ciclo");
        }

        snapshot
    }
}

/// NaN/inf do sensor viram "sem leitura".
fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
