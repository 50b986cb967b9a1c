//! # AirQ Agent
//!
//! Lê os sensores da estação de qualidade do ar (DHT22, MQ-135, CCS811,
//! PMS5003) e publica a telemetria via MQTT em intervalo fixo,
//! reconectando rede e broker sempre que a conectividade cair.
//!
//! ## Uso
//! ```bash
//! airq_agent                      # usa ./config.toml (criado no 1º run)
//! RUST_LOG=debug airq_agent       # diagnóstico por canal de sensor
//! ```

mod connectivity;
mod hw;
mod mqtt;
mod net;
mod publisher;
mod sensors;

use airq_core::config::AgentConfig;
use connectivity::{ConnectivityManager, RetryPolicy};
use publisher::TelemetryPublisher;
use sensors::SensorReader;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AgentConfig::default_path();
    let config = AgentConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Configuração inválida: {e}");
        }
        std::process::exit(1);
    }

    let interval = Duration::from_secs_f64(config.sampling.interval_secs);

    // ── Hardware ──
    // A serial do PMS5003 é hardware obrigatório: sem ela o agente não sobe
    let serial = match hw::SerialByteSource::open(&config.hardware) {
        Ok(s) => {
            info!("✓ PMS5003: serial {} aberta", config.hardware.serial_port);
            s
        }
        Err(e) => {
            error!(
                "✗ PMS5003: falha ao abrir {}: {e}",
                config.hardware.serial_port
            );
            std::process::exit(1);
        }
    };

    let reader = SensorReader::new(
        hw::IioClimateSensor::new(&config.hardware),
        hw::IioAdcChannel::new(&config.hardware),
        hw::IioAirQualitySensor::new(&config.hardware),
        serial,
    );

    // ── Transporte ──
    let link = net::TcpProbeLink::new(
        config.link.probe_addr.clone(),
        Duration::from_secs_f64(config.link.probe_timeout_secs),
    );
    let session = mqtt::MqttSession::new(
        &config.broker,
        Duration::from_secs_f64(config.session.io_timeout_secs),
    );
    let connectivity = ConnectivityManager::new(
        link,
        session,
        config.broker.client_id.clone(),
        RetryPolicy::from(&config.link.retry),
        RetryPolicy::from(&config.session.retry),
    );

    let mut publisher =
        TelemetryPublisher::new(reader, connectivity, config.broker.topic.clone());

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   🌫 AIRQ AGENT – ATIVO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Broker:    {}:{}", config.broker.host, config.broker.port);
    println!("  Tópico:    {}", config.broker.topic);
    println!("  Intervalo: {:.1}s", config.sampling.interval_secs);
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    loop {
        let cycle_start = Instant::now();

        // Com a política de produção (retry ilimitado) o ciclo só retorna
        // depois de publicar; o Err é alcançável apenas com retry limitado
        if let Err(e) = publisher.run_cycle() {
            error!("Ciclo abortado: {e}");
        }

        // Dormir pelo tempo restante do intervalo
        let elapsed = cycle_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }
}
