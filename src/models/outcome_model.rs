use std::fmt;

/// Resultado de intentar un envío con un sender concreto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// El transporte confirmó la entrega.
    Sent { sender_id: String },
    /// El transporte falló (red, API, SMTP, upload del adjunto).
    Failed { reason: String },
    /// El sender llegó a su límite diario; no se llamó al transporte.
    RateLimited { sender_id: String },
    /// Configuración incompleta (id, credencial o adjunto); no se llamó
    /// al transporte.
    MissingConfig { sender_id: String },
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. })
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Sent { sender_id } => write!(f, "Sent via {}", sender_id),
            SendOutcome::Failed { reason } => write!(f, "Failed: {}", reason),
            SendOutcome::RateLimited { sender_id } => {
                write!(f, "Skipped: {} rate-limited", sender_id)
            }
            SendOutcome::MissingConfig { sender_id } => {
                write!(f, "Skipped: {} missing config", sender_id)
            }
        }
    }
}

/// Resultado consolidado de un target tras agotar la secuencia de senders.
/// Solo se serializa a string en la frontera con la hoja de cálculo.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub sequence_len: usize,
    pub outcomes: Vec<SendOutcome>,
}

impl TargetReport {
    pub fn new(sequence_len: usize) -> Self {
        TargetReport {
            sequence_len,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: SendOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    /// "Completed: Sent X/Y. Details: [...]"
    pub fn to_status_string(&self) -> String {
        let details: Vec<String> = self.outcomes.iter().map(|o| o.to_string()).collect();
        format!(
            "Completed: Sent {}/{}. Details: [{}]",
            self.sent_count(),
            self.sequence_len,
            details.join(", ")
        )
    }
}
