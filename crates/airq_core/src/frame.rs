//! Parser do frame binário do PMS5003.
//!
//! O sensor emite registros de exatamente 32 bytes pela serial:
//!
//! ```text
//! ┌──────┬──────┬────────────────┬─────────┬─────────┬──────────────┐
//! │ 0x42 │ 0x4D │ ...            │ PM2.5   │ PM10    │ ...          │
//! │ [0]  │ [1]  │ [2..12]        │ [12..14]│ [14..16]│ [16..32]     │
//! └──────┴──────┴────────────────┴─────────┴─────────┴──────────────┘
//! ```
//!
//! - Assinatura de início de frame: `0x42 0x4D` ("BM")
//! - PM2.5 e PM10 são u16 big-endian nos offsets 12 e 14
//! - O checksum do sensor (bytes 30..32) não é verificado; um frame com
//!   assinatura válida é aceito integralmente

use crate::types::ParticulateReading;

/// Tamanho fixo do frame emitido pelo PMS5003.
pub const FRAME_LEN: usize = 32;

/// Primeiro byte da assinatura de início de frame.
pub const FRAME_SIG0: u8 = 0x42;

/// Segundo byte da assinatura de início de frame.
pub const FRAME_SIG1: u8 = 0x4D;

/// Offset do PM2.5 (u16 big-endian).
const PM25_OFFSET: usize = 12;

/// Offset do PM10 (u16 big-endian).
const PM10_OFFSET: usize = 14;

/// Erros de parse do frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Frame muito curto ({0} bytes, esperado {FRAME_LEN})")]
    TooShort(usize),

    #[error("Assinatura inválida: 0x{0:02X} 0x{1:02X} (esperado 0x{FRAME_SIG0:02X} 0x{FRAME_SIG1:02X})")]
    BadSignature(u8, u8),
}

/// Decodifica um frame do PMS5003 em concentrações físicas.
///
/// Função pura: valida a assinatura antes de interpretar qualquer outro
/// byte. Quem chama deve cair para o sentinela em caso de erro, nunca
/// repetir o parse do mesmo buffer.
pub fn parse_frame(data: &[u8]) -> Result<ParticulateReading, FrameError> {
    if data.len() < FRAME_LEN {
        return Err(FrameError::TooShort(data.len()));
    }

    if data[0] != FRAME_SIG0 || data[1] != FRAME_SIG1 {
        return Err(FrameError::BadSignature(data[0], data[1]));
    }

    let pm25 = u16::from_be_bytes([data[PM25_OFFSET], data[PM25_OFFSET + 1]]);
    let pm10 = u16::from_be_bytes([data[PM10_OFFSET], data[PM10_OFFSET + 1]]);

    Ok(ParticulateReading {
        pm25: f32::from(pm25),
        pm10: f32::from(pm10),
    })
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(sig0: u8, sig1: u8, pm25: u16, pm10: u16) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        buf[0] = sig0;
        buf[1] = sig1;
        buf[12..14].copy_from_slice(&pm25.to_be_bytes());
        buf[14..16].copy_from_slice(&pm10.to_be_bytes());
        buf
    }

    #[test]
    fn parses_reference_frame() {
        // 0x0064 = 100, 0x00C8 = 200
        let buf = frame_with(0x42, 0x4D, 100, 200);
        let reading = parse_frame(&buf).unwrap();
        assert_eq!(reading.pm25, 100.0);
        assert_eq!(reading.pm10, 200.0);
    }

    #[test]
    fn ignores_remaining_bytes() {
        // Checksum e demais campos são arbitrários; só a assinatura e os
        // offsets de PM importam
        let mut buf = frame_with(0x42, 0x4D, 100, 200);
        for b in buf[16..].iter_mut() {
            *b = 0xFF;
        }
        buf[2] = 0xAA;
        let reading = parse_frame(&buf).unwrap();
        assert_eq!(reading.pm25, 100.0);
        assert_eq!(reading.pm10, 200.0);
    }

    #[test]
    fn rejects_bad_signature() {
        let buf = frame_with(0x41, 0x4D, 100, 200);
        assert!(matches!(
            parse_frame(&buf),
            Err(FrameError::BadSignature(0x41, 0x4D))
        ));

        let buf = frame_with(0x42, 0x4E, 100, 200);
        assert!(matches!(
            parse_frame(&buf),
            Err(FrameError::BadSignature(0x42, 0x4E))
        ));
    }

    #[test]
    fn bad_signature_never_yields_values() {
        // Mesmo com bytes de PM plausíveis, assinatura errada nunca produz
        // uma leitura parcial
        for sig in [[0x00u8, 0x00], [0x4D, 0x42], [0xFF, 0x4D], [0x42, 0x00]] {
            let buf = frame_with(sig[0], sig[1], 999, 999);
            assert!(parse_frame(&buf).is_err());
        }
    }

    #[test]
    fn rejects_short_buffer() {
        let buf = [0x42u8, 0x4D, 0x00];
        assert!(matches!(parse_frame(&buf), Err(FrameError::TooShort(3))));
    }

    #[test]
    fn zero_concentrations_parse_as_zero() {
        let buf = frame_with(0x42, 0x4D, 0, 0);
        let reading = parse_frame(&buf).unwrap();
        assert_eq!(reading.pm25, 0.0);
        assert_eq!(reading.pm10, 0.0);
    }
}
