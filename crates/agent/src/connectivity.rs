//! Máquina de estados de conectividade: link de rede + sessão MQTT.
//!
//! Garante que uma publicação só acontece com link e sessão estabelecidos.
//! Falha de conectividade é recuperada com retry bloqueante – o agente não
//! tem outra obrigação além de publicar, então bloquear é aceitável. A
//! política de retry é injetada para que testes limitem a execução; em
//! produção o padrão é ilimitado (`max_attempts = 0`).

use airq_core::config::RetryConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

// ──────────────────────────────────────────────
// Capabilities de transporte
// ──────────────────────────────────────────────

/// Link de rede subjacente (camada abaixo da sessão MQTT).
pub trait NetworkLink {
    /// Dispara o estabelecimento do link; o progresso é observado via
    /// [`NetworkLink::is_connected`].
    fn begin(&mut self);
    fn is_connected(&mut self) -> bool;
    fn local_address(&self) -> Option<SocketAddr>;
}

/// Sessão publish/subscribe com o broker.
pub trait BrokerSession {
    fn connect(&mut self, client_id: &str) -> bool;
    fn connected(&mut self) -> bool;
    /// Emite o registro; o resultado de entrega não é rastreado (QoS 0).
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool;
    /// Manutenção interna do transporte (keep-alive, drenagem de eventos).
    fn poll(&mut self);
    fn last_error(&self) -> Option<String>;
}

// ──────────────────────────────────────────────
// Estado e política
// ──────────────────────────────────────────────

/// Estado de conectividade do agente.
///
/// Avança somente em caso de sucesso; qualquer perda de sessão detectada
/// volta incondicionalmente para `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectivityState {
    Disconnected,
    LinkUp,
    SessionUp,
}

/// Política de retry de uma camada de conectividade.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Espera entre tentativas
    pub delay: Duration,
    /// Máximo de ciclos de espera (0 = ilimitado)
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Política de produção: insiste até conseguir.
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: 0,
        }
    }

    /// Política limitada, para testes e diagnóstico.
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts != 0 && attempts >= self.max_attempts
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            delay: cfg.delay(),
            max_attempts: cfg.max_attempts,
        }
    }
}

/// Erros de conectividade – só alcançáveis com política limitada.
#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    #[error("Link de rede não estabelecido após {0} tentativas")]
    LinkRetryExhausted(u32),

    #[error("Sessão MQTT não estabelecida após {0} tentativas")]
    SessionRetryExhausted(u32),
}

// ──────────────────────────────────────────────
// ConnectivityManager
// ──────────────────────────────────────────────

/// Dono do estado de conectividade e dos handles de transporte.
pub struct ConnectivityManager {
    link: Box<dyn NetworkLink>,
    session: Box<dyn BrokerSession>,
    client_id: String,
    link_retry: RetryPolicy,
    session_retry: RetryPolicy,
    state: ConnectivityState,
}

impl ConnectivityManager {
    pub fn new(
        link: impl NetworkLink + 'static,
        session: impl BrokerSession + 'static,
        client_id: impl Into<String>,
        link_retry: RetryPolicy,
        session_retry: RetryPolicy,
    ) -> Self {
        Self {
            link: Box::new(link),
            session: Box::new(session),
            client_id: client_id.into(),
            link_retry,
            session_retry,
            state: ConnectivityState::Disconnected,
        }
    }

    /// Estado corrente da máquina.
    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Garante o link de rede, bloqueando com retry enquanto ele não sobe.
    pub fn ensure_link(&mut self) -> Result<(), ConnectivityError> {
        if self.state >= ConnectivityState::LinkUp && self.link.is_connected() {
            return Ok(());
        }

        self.state = ConnectivityState::Disconnected;
        info!("Estabelecendo link de rede…");
        self.link.begin();

        let mut attempts = 0u32;
        while !self.link.is_connected() {
            attempts += 1;
            if self.link_retry.exhausted(attempts) {
                return Err(ConnectivityError::LinkRetryExhausted(attempts));
            }
            std::thread::sleep(self.link_retry.delay);
        }

        self.state = ConnectivityState::LinkUp;
        match self.link.local_address() {
            Some(addr) => info!("Link de rede ativo – endereço local {addr}"),
            None => info!("Link de rede ativo"),
        }
        Ok(())
    }

    /// Garante a sessão com o broker (garante o link antes).
    pub fn ensure_session(&mut self) -> Result<(), ConnectivityError> {
        if self.state == ConnectivityState::SessionUp {
            if self.session.connected() {
                return Ok(());
            }
            warn!("Sessão MQTT perdida – reconstruindo conectividade");
            self.state = ConnectivityState::Disconnected;
        }

        self.ensure_link()?;

        let mut attempts = 0u32;
        while !self.session.connected() {
            info!("Conectando ao broker MQTT…");
            if self.session.connect(&self.client_id) {
                break;
            }

            attempts += 1;
            let reason = self
                .session
                .last_error()
                .unwrap_or_else(|| "motivo desconhecido".into());
            warn!(
                "Falha ao conectar ao broker ({reason}) – nova tentativa em {:.1}s",
                self.session_retry.delay.as_secs_f64()
            );
            if self.session_retry.exhausted(attempts) {
                return Err(ConnectivityError::SessionRetryExhausted(attempts));
            }
            std::thread::sleep(self.session_retry.delay);
        }

        self.state = ConnectivityState::SessionUp;
        info!("Sessão MQTT estabelecida como '{}'", self.client_id);
        Ok(())
    }

    /// Publica um registro no tópico dado.
    ///
    /// Se a sessão caiu desde o último ciclo, volta para `Disconnected` e
    /// reconstrói link + sessão de forma síncrona antes de emitir – pode
    /// bloquear por tempo arbitrário. O transporte nunca é acionado fora
    /// de `SessionUp`.
    pub fn publish(&mut self, topic: &str, record: &str) -> Result<(), ConnectivityError> {
        if self.state != ConnectivityState::SessionUp || !self.session.connected() {
            if self.state == ConnectivityState::SessionUp {
                warn!("Sessão MQTT caiu – reconectando antes de publicar");
            }
            self.state = ConnectivityState::Disconnected;
            self.ensure_link()?;
            self.ensure_session()?;
        }

        self.session.poll();
        if !self.session.publish(topic, record.as_bytes()) {
            // Fire-and-forget: registra e segue para o próximo ciclo
            warn!("Transporte não aceitou a publicação em '{topic}'");
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
