//! Configuração unificada via TOML.
//!
//! Substitui o `secrets.h` e os pinos hardcoded do firmware antigo por um
//! único `config.toml`: broker MQTT, intervalo de amostragem, política de
//! reconexão e caminhos de hardware (porta serial + atributos iio).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuração do broker MQTT.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Host do broker (IP ou hostname)
    pub host: String,
    /// Porta do broker
    pub port: u16,
    /// Identificador do cliente MQTT
    pub client_id: String,
    /// Tópico de publicação da telemetria
    pub topic: String,
    /// Keep-alive da sessão MQTT (segundos)
    pub keepalive_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.10".into(),
            port: 1883,
            client_id: "airq-station".into(),
            topic: "airq/telemetry".into(),
            keepalive_secs: 30,
        }
    }
}

/// Configuração do ciclo de amostragem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Intervalo entre ciclos de leitura/publicação (segundos)
    pub interval_secs: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { interval_secs: 5.0 }
    }
}

/// Política de retry de uma camada de conectividade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Espera entre tentativas (segundos)
    pub delay_secs: f64,
    /// Máximo de tentativas (0 = ilimitado, comportamento de produção)
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_secs: 5.0,
            max_attempts: 0,
        }
    }
}

impl RetryConfig {
    /// Espera entre tentativas como [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }
}

/// Configuração do link de rede.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Endereço TCP sondado para verificar o link (host:porta)
    pub probe_addr: String,
    /// Timeout da sonda (segundos)
    pub probe_timeout_secs: f64,
    /// Retry de estabelecimento do link
    pub retry: RetryConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            probe_addr: "8.8.8.8:53".into(),
            probe_timeout_secs: 1.0,
            retry: RetryConfig {
                delay_secs: 0.5,
                max_attempts: 0,
            },
        }
    }
}

/// Configuração da sessão com o broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Retry de estabelecimento da sessão
    pub retry: RetryConfig,
    /// Timeout de I/O de uma operação MQTT (segundos)
    pub io_timeout_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig {
                delay_secs: 5.0,
                max_attempts: 0,
            },
            io_timeout_secs: 3.0,
        }
    }
}

/// Caminhos de hardware da estação.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Porta serial do PMS5003
    pub serial_port: String,
    /// Baud rate do PMS5003
    pub serial_baud: u32,
    /// Timeout de leitura da serial (segundos)
    pub serial_timeout_secs: f64,
    /// Atributo iio de temperatura do DHT22 (milligraus)
    pub temperature_path: String,
    /// Atributo iio de umidade do DHT22 (mili-%)
    pub humidity_path: String,
    /// Atributo iio do canal ADC do MQ-135 (contagem bruta)
    pub gas_path: String,
    /// Atributo iio de eCO2 do CCS811 (ppm)
    pub eco2_path: String,
    /// Atributo iio de TVOC do CCS811 (ppb)
    pub tvoc_path: String,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyAMA0".into(),
            serial_baud: 9600,
            serial_timeout_secs: 1.0,
            temperature_path: "/sys/bus/iio/devices/iio:device0/in_temp_input".into(),
            humidity_path: "/sys/bus/iio/devices/iio:device0/in_humidityrelative_input".into(),
            gas_path: "/sys/bus/iio/devices/iio:device1/in_voltage0_raw".into(),
            eco2_path: "/sys/bus/iio/devices/iio:device2/in_concentration_co2_input".into(),
            tvoc_path: "/sys/bus/iio/devices/iio:device2/in_concentration_voc_input".into(),
        }
    }
}

/// Configuração raiz do agente.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub broker: BrokerConfig,
    pub sampling: SamplingConfig,
    pub link: LinkConfig,
    pub session: SessionConfig,
    pub hardware: HardwareConfig,
}

impl AgentConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AgentConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AgentConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.broker.host.is_empty() {
            errors.push("Host do broker não pode ser vazio".into());
        }
        if self.broker.port == 0 {
            errors.push("Porta do broker não pode ser 0".into());
        }
        if self.broker.client_id.is_empty() {
            errors.push("client_id não pode ser vazio".into());
        }
        if self.broker.topic.is_empty() {
            errors.push("Tópico de publicação não pode ser vazio".into());
        }
        if self.broker.keepalive_secs < 5 {
            errors.push(format!(
                "Keep-alive MQTT muito curto: {}s (mínimo 5s)",
                self.broker.keepalive_secs
            ));
        }
        if self.sampling.interval_secs < 1.0 || self.sampling.interval_secs > 3600.0 {
            errors.push(format!(
                "Intervalo de amostragem inválido: {} (1.0–3600.0)",
                self.sampling.interval_secs
            ));
        }
        if self.hardware.serial_port.is_empty() {
            errors.push("Porta serial do PMS5003 não pode ser vazia".into());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AgentConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn roundtrip_toml() {
        let config = AgentConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AgentConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.broker.port, parsed.broker.port);
        assert_eq!(config.broker.topic, parsed.broker.topic);
        assert_eq!(config.hardware.serial_port, parsed.hardware.serial_port);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[broker]
host = "10.0.0.2"
"#;
        let config: AgentConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.broker.host, "10.0.0.2");
        // Outros campos devem ter valor padrão
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.sampling.interval_secs, 5.0);
        assert_eq!(config.session.retry.delay_secs, 5.0);
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let mut config = AgentConfig::default();
        config.sampling.interval_secs = 0.0;
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn short_keepalive_is_rejected() {
        let mut config = AgentConfig::default();
        config.broker.keepalive_secs = 1;
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn zero_max_attempts_means_unbounded() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 0);
        assert_eq!(retry.delay(), Duration::from_secs(5));
    }
}
