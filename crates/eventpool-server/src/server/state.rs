use eventpool::Ingestor;

/// Represents the state of the server.
#[derive(Clone)]
pub struct ServerState {
    pub ingestor: Ingestor,
}

impl ServerState {
    pub fn new(ingestor: Ingestor) -> Self {
        Self { ingestor }
    }
}
