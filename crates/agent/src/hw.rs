//! Bindings de hardware do gateway Linux.
//!
//! Os sensores I2C/GPIO/ADC chegam pelo Industrial I/O do kernel: cada
//! canal é um arquivo de atributo em sysfs com um número decimal dentro.
//! O PMS5003 é o único que fala direto com o agente, pela porta serial.
//!
//! Falha de leitura aqui nunca propaga: cada impl devolve o valor de
//! falha da sua capability (NaN, 0, `Err`) e deixa a política de
//! degradação com o [`crate::sensors::SensorReader`].

use crate::sensors::{AirQualitySensor, ByteSource, ClimateSensor, GasSensor};
use airq_core::config::HardwareConfig;
use airq_core::types::AirQuality;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

// ──────────────────────────────────────────────
// Atributos iio
// ──────────────────────────────────────────────

/// Interpreta o conteúdo de um atributo iio (decimal com newline).
fn parse_iio_value(content: &str) -> Option<f32> {
    content.trim().parse::<f32>().ok()
}

/// Lê um atributo iio e aplica o fator de escala.
fn read_iio_value(path: &Path, scale: f32) -> Option<f32> {
    match std::fs::read_to_string(path) {
        Ok(content) => match parse_iio_value(&content) {
            Some(v) => Some(v * scale),
            None => {
                debug!("Conteúdo inesperado em {}: {content:?}", path.display());
                None
            }
        },
        Err(e) => {
            debug!("Falha ao ler {}: {e}", path.display());
            None
        }
    }
}

/// DHT22 via driver iio (atributos `*_input` em miliunidades).
pub struct IioClimateSensor {
    temperature_path: PathBuf,
    humidity_path: PathBuf,
}

impl IioClimateSensor {
    pub fn new(hw: &HardwareConfig) -> Self {
        Self {
            temperature_path: PathBuf::from(&hw.temperature_path),
            humidity_path: PathBuf::from(&hw.humidity_path),
        }
    }
}

impl ClimateSensor for IioClimateSensor {
    fn read_temperature(&mut self) -> f32 {
        // milligraus → °C
        read_iio_value(&self.temperature_path, 0.001).unwrap_or(f32::NAN)
    }

    fn read_humidity(&mut self) -> f32 {
        // mili-% → %
        read_iio_value(&self.humidity_path, 0.001).unwrap_or(f32::NAN)
    }
}

/// Canal ADC do MQ-135 (contagem bruta, sem escala).
pub struct IioAdcChannel {
    path: PathBuf,
}

impl IioAdcChannel {
    pub fn new(hw: &HardwareConfig) -> Self {
        Self {
            path: PathBuf::from(&hw.gas_path),
        }
    }
}

impl GasSensor for IioAdcChannel {
    fn sample(&mut self) -> i32 {
        // O contrato do canal analógico é sempre entregar um valor
        read_iio_value(&self.path, 1.0).map_or(0, |v| v as i32)
    }
}

/// CCS811 via driver iio.
pub struct IioAirQualitySensor {
    eco2_path: PathBuf,
    tvoc_path: PathBuf,
}

impl IioAirQualitySensor {
    pub fn new(hw: &HardwareConfig) -> Self {
        Self {
            eco2_path: PathBuf::from(&hw.eco2_path),
            tvoc_path: PathBuf::from(&hw.tvoc_path),
        }
    }
}

impl AirQualitySensor for IioAirQualitySensor {
    fn data_available(&mut self) -> bool {
        self.eco2_path.exists()
    }

    fn read(&mut self) -> Result<AirQuality, String> {
        let eco2 = read_iio_value(&self.eco2_path, 1.0)
            .ok_or_else(|| format!("sem leitura em {}", self.eco2_path.display()))?;
        let tvoc = read_iio_value(&self.tvoc_path, 1.0)
            .ok_or_else(|| format!("sem leitura em {}", self.tvoc_path.display()))?;

        Ok(AirQuality {
            eco2: eco2.clamp(0.0, f32::from(u16::MAX)) as u16,
            tvoc: tvoc.clamp(0.0, f32::from(u16::MAX)) as u16,
        })
    }
}

// ──────────────────────────────────────────────
// Serial do PMS5003
// ──────────────────────────────────────────────

/// Porta serial do PMS5003 (9600 8N1 por padrão).
pub struct SerialByteSource {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialByteSource {
    pub fn open(hw: &HardwareConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(&hw.serial_port, hw.serial_baud)
            .timeout(Duration::from_secs_f64(hw.serial_timeout_secs))
            .open()?;
        Ok(Self { port })
    }
}

impl ByteSource for SerialByteSource {
    fn available(&mut self) -> usize {
        match self.port.bytes_to_read() {
            Ok(n) => n as usize,
            Err(e) => {
                debug!("bytes_to_read falhou: {e}");
                0
            }
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.port.read_exact(buf)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_attribute() {
        assert_eq!(parse_iio_value("23400\n"), Some(23400.0));
        assert_eq!(parse_iio_value("  -5100 "), Some(-5100.0));
        assert_eq!(parse_iio_value("412"), Some(412.0));
    }

    #[test]
    fn rejects_garbage_attribute() {
        assert_eq!(parse_iio_value(""), None);
        assert_eq!(parse_iio_value("N/A\n"), None);
        assert_eq!(parse_iio_value("12,5"), None);
    }

    #[test]
    fn missing_attribute_reads_as_none() {
        let path = Path::new("/sys/bus/iio/devices/iio:device99/nao_existe");
        assert_eq!(read_iio_value(path, 0.001), None);
    }

    #[test]
    fn climate_sensor_degrades_to_nan() {
        let hw = HardwareConfig {
            temperature_path: "/nao/existe/in_temp_input".into(),
            humidity_path: "/nao/existe/in_humidityrelative_input".into(),
            ..Default::default()
        };
        let mut sensor = IioClimateSensor::new(&hw);
        assert!(sensor.read_temperature().is_nan());
        assert!(sensor.read_humidity().is_nan());
    }

    #[test]
    fn adc_channel_degrades_to_zero() {
        let hw = HardwareConfig {
            gas_path: "/nao/existe/in_voltage0_raw".into(),
            ..Default::default()
        };
        let mut sensor = IioAdcChannel::new(&hw);
        assert_eq!(sensor.sample(), 0);
    }

    #[test]
    fn air_quality_unavailable_without_device() {
        let hw = HardwareConfig {
            eco2_path: "/nao/existe/in_concentration_co2_input".into(),
            tvoc_path: "/nao/existe/in_concentration_voc_input".into(),
            ..Default::default()
        };
        let mut sensor = IioAirQualitySensor::new(&hw);
        assert!(!sensor.data_available());
        assert!(sensor.read().is_err());
    }
}
