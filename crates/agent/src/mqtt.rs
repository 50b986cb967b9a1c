//! Sessão MQTT sobre o cliente síncrono do rumqttc.
//!
//! O cliente síncrono exige que o event loop seja bombeado manualmente
//! ([`Connection::recv_timeout`]) – o que casa com o modelo
//! single-thread do agente: todo progresso de I/O acontece dentro das
//! chamadas da capability, nunca em background.

use crate::connectivity::BrokerSession;
use airq_core::config::BrokerConfig;
use rumqttc::{Client, ConnectReturnCode, Connection, Event, MqttOptions, Outgoing, Packet, QoS};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Sessão com o broker, reconstruída do zero a cada `connect`.
pub struct MqttSession {
    host: String,
    port: u16,
    keepalive: Duration,
    /// Orçamento de bombeamento do event loop por operação
    io_timeout: Duration,
    conn: Option<(Client, Connection)>,
    connected: bool,
    last_error: Option<String>,
}

impl MqttSession {
    pub fn new(broker: &BrokerConfig, io_timeout: Duration) -> Self {
        Self {
            host: broker.host.clone(),
            port: broker.port,
            keepalive: Duration::from_secs(broker.keepalive_secs),
            io_timeout,
            conn: None,
            connected: false,
            last_error: None,
        }
    }

    fn fail(&mut self, reason: String) {
        debug!("Sessão MQTT degradada: {reason}");
        self.last_error = Some(reason);
        self.connected = false;
        self.conn = None;
    }

    /// Drena eventos pendentes do event loop dentro do orçamento dado.
    ///
    /// Mantém o keep-alive vivo e detecta desconexões silenciosas.
    fn drain_events(&mut self, budget: Duration) {
        let deadline = Instant::now() + budget;
        loop {
            if self.conn.is_none() {
                return;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }

            let event = match self.conn.as_mut() {
                Some((_, connection)) => connection.recv_timeout(remaining),
                None => return,
            };
            match event {
                Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                    self.fail("broker encerrou a sessão".into());
                    return;
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    self.fail(e.to_string());
                    return;
                }
                // Sem eventos pendentes
                Err(_) => return,
            }
        }
    }
}

impl BrokerSession for MqttSession {
    fn connect(&mut self, client_id: &str) -> bool {
        // Cliente novo a cada tentativa; o retry fica com quem chama
        self.conn = None;
        self.connected = false;

        let mut options = MqttOptions::new(client_id, &self.host, self.port);
        options.set_keep_alive(self.keepalive);
        let (client, mut connection) = Client::new(options, 16);

        let deadline = Instant::now() + self.io_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.last_error = Some("timeout aguardando ConnAck".into());
                return false;
            }

            match connection.recv_timeout(remaining) {
                Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                    if ack.code == ConnectReturnCode::Success {
                        self.conn = Some((client, connection));
                        self.connected = true;
                        self.last_error = None;
                        return true;
                    }
                    self.last_error = Some(format!("broker recusou a conexão: {:?}", ack.code));
                    return false;
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    self.last_error = Some(e.to_string());
                    return false;
                }
                Err(_) => {
                    self.last_error = Some("timeout aguardando ConnAck".into());
                    return false;
                }
            }
        }
    }

    fn connected(&mut self) -> bool {
        if self.conn.is_none() {
            return false;
        }
        // Bombeia rapidamente para detectar queda antes de responder
        self.drain_events(Duration::from_millis(5));
        self.connected && self.conn.is_some()
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        let queued = match self.conn.as_mut() {
            Some((client, _)) => client.publish(topic, QoS::AtMostOnce, false, payload.to_vec()),
            None => return false,
        };
        if let Err(e) = queued {
            self.fail(e.to_string());
            return false;
        }

        // Bombeia o event loop até o pacote sair pelo socket
        let deadline = Instant::now() + self.io_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!("Timeout esvaziando a fila de publicação");
                return false;
            }

            let event = match self.conn.as_mut() {
                Some((_, connection)) => connection.recv_timeout(remaining),
                None => return false,
            };
            match event {
                Ok(Ok(Event::Outgoing(Outgoing::Publish(_)))) => return true,
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    self.fail(e.to_string());
                    return false;
                }
                Err(_) => {
                    warn!("Timeout esvaziando a fila de publicação");
                    return false;
                }
            }
        }
    }

    fn poll(&mut self) {
        self.drain_events(Duration::from_millis(10));
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }
}
