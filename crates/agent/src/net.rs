//! Link de rede verificado por sonda TCP.
//!
//! No gateway Linux não existe "subir o WiFi" – o sistema operacional é
//! dono da interface. O que o agente precisa saber é se a rede alcança o
//! mundo externo, e a forma mais barata de medir isso é abrir uma conexão
//! TCP curta contra um endereço estável.

use crate::connectivity::NetworkLink;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info};

/// Link implementado como sonda TCP contra um endereço configurado.
pub struct TcpProbeLink {
    probe_addr: String,
    timeout: Duration,
    local_addr: Option<SocketAddr>,
}

impl TcpProbeLink {
    pub fn new(probe_addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            probe_addr: probe_addr.into(),
            timeout,
            local_addr: None,
        }
    }
}

impl NetworkLink for TcpProbeLink {
    fn begin(&mut self) {
        info!("Sondando a rede via {}", self.probe_addr);
    }

    fn is_connected(&mut self) -> bool {
        let addr = match self.probe_addr.to_socket_addrs() {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => {
                    debug!("Endereço de sonda sem resolução: {}", self.probe_addr);
                    self.local_addr = None;
                    return false;
                }
            },
            Err(e) => {
                debug!("Falha ao resolver {}: {e}", self.probe_addr);
                self.local_addr = None;
                return false;
            }
        };

        match TcpStream::connect_timeout(&addr, self.timeout) {
            Ok(stream) => {
                self.local_addr = stream.local_addr().ok();
                true
            }
            Err(e) => {
                debug!("Sonda TCP falhou ({addr}): {e}");
                self.local_addr = None;
                false
            }
        }
    }

    fn local_address(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn reports_up_against_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut link = TcpProbeLink::new(addr.to_string(), Duration::from_millis(500));
        assert!(link.local_address().is_none());
        assert!(link.is_connected());
        assert!(link.local_address().is_some());
    }

    #[test]
    fn reports_down_against_closed_port() {
        // Porta efêmera liberada na hora: a sonda deve falhar
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let mut link = TcpProbeLink::new(addr.to_string(), Duration::from_millis(200));
        assert!(!link.is_connected());
        assert!(link.local_address().is_none());
    }

    #[test]
    fn reports_down_on_unresolvable_address() {
        let mut link = TcpProbeLink::new("isso-nao-resolve:1", Duration::from_millis(200));
        assert!(!link.is_connected());
    }
}
