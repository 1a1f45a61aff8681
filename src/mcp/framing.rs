//! Remontagem de linhas a partir de chunks arbitrários de bytes.

/// Buffer de remontagem de linhas.
///
/// Entre duas chamadas a [`push`](Self::push) o buffer guarda no máximo um
/// fragmento incompleto, que nunca contém `\n`.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Cria um buffer vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acrescenta um chunk e devolve as linhas completas, sem o terminador.
    ///
    /// Um `\r` final em cada linha também é removido.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let fragment = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, fragment);

        complete[..last_newline]
            .split(|b| *b == b'\n')
            .map(|line| strip_cr(line).to_vec())
            .collect()
    }

    /// Esvazia o buffer no fim do stream, devolvendo o fragmento restante.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(strip_cr(&rest).to_vec())
    }

    /// Tamanho do fragmento pendente, em bytes.
    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
