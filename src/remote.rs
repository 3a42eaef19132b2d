//! Links to source files on a hosted repository.

use serde::{Deserialize, Serialize};

const GITLAB_URL: &str = "https://gitlab.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    Github,
    Gitlab,
    Bitbucket,
}

/// A hosted repository plus the local checkout its files live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub kind: RemoteKind,
    /// `vendor/project`.
    pub name: String,
    /// Absolute path of the local checkout.
    pub local_path: String,
    /// Base URL of a self-hosted GitLab instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RemoteRepository {
    pub fn new(kind: RemoteKind, name: impl Into<String>, local_path: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            local_path: local_path.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// `file` with the local checkout path removed.  Empty when the path
    /// does not occur exactly once in `file`.
    pub fn relative_path(&self, file: &str) -> String {
        if self.local_path.is_empty() || file.matches(self.local_path.as_str()).count() != 1 {
            return String::new();
        }
        file.replacen(self.local_path.as_str(), "", 1)
    }

    /// URL of `relative_path` at `version`, pointing at `line` when given.
    pub fn file_url(&self, version: &str, relative_path: &str, line: Option<usize>) -> String {
        let path = format!("{}{}", version, relative_path).replace('\\', "/");
        match self.kind {
            RemoteKind::Github => {
                let mut url = format!("https://github.com/{}/blob/{}", self.name, path);
                if let Some(line) = line {
                    url.push_str(&format!("#L{}", line));
                }
                url
            }
            RemoteKind::Gitlab => {
                let base = self
                    .url
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .unwrap_or(GITLAB_URL);
                let mut url = format!("{}{}/blob/{}", base, self.name, path);
                if let Some(line) = line {
                    url.push_str(&format!("#L{}", line));
                }
                url
            }
            RemoteKind::Bitbucket => {
                let mut url = format!("https://bitbucket.org/{}/src/{}", self.name, path);
                if let Some(line) = line {
                    let file = relative_path
                        .rsplit(['/', '\\'])
                        .next()
                        .unwrap_or(relative_path);
                    url.push_str(&format!("#{}-{}", file, line));
                }
                url
            }
        }
    }
}
