// Export module - turns the current result set into playlist files
// Serializers are pure; ExportManager only decides where the bytes land

use crate::catalog::Song;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    M3u,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "playlist.csv",
            ExportFormat::M3u => "playlist.m3u",
        }
    }

    pub fn render(&self, songs: &[Song]) -> String {
        match self {
            ExportFormat::Csv => to_csv(songs),
            ExportFormat::M3u => to_m3u(songs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// CSV with a `title,artist,tempo,energy,path` header and CRLF between records.
///
/// Always emits the header, even for an empty result set.
pub fn to_csv(songs: &[Song]) -> String {
    let mut lines = Vec::with_capacity(songs.len() + 1);
    lines.push(Song::FIELDS.join(","));

    for song in songs {
        let record = [
            escape_csv_field(&song.title),
            escape_csv_field(&song.artist),
            song.tempo.to_string(),
            song.energy.to_string(),
            escape_csv_field(&song.path),
        ];
        lines.push(record.join(","));
    }

    lines.join("\r\n")
}

/// Bare M3U: one path per line, no `#EXTM3U` header, no trailing newline
pub fn to_m3u(songs: &[Song]) -> String {
    songs
        .iter()
        .map(|song| song.path.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_csv_field(field: &str) -> String {
    let needs_quotes = field.contains([',', '"', '\r', '\n'])
        || field.starts_with(' ')
        || field.ends_with(' ');

    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Writes rendered playlists into a single export directory
pub struct ExportManager {
    export_dir: PathBuf,
}

impl ExportManager {
    pub fn new<P: AsRef<Path>>(export_dir: P) -> Self {
        Self {
            export_dir: export_dir.as_ref().to_path_buf(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Render and write, replacing any previous file. Returns the written path.
    pub fn export(&self, format: ExportFormat, songs: &[Song]) -> Result<PathBuf, ExportError> {
        let path = self.export_dir.join(format.file_name());
        let content = format.render(songs);

        fs::create_dir_all(&self.export_dir).map_err(|source| ExportError::Io {
            path: self.export_dir.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Exported {} songs to {}", songs.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn single() -> Vec<Song> {
        vec![Song::new("A", "X", 120.0, 5.0, "/a.mp3")]
    }

    #[test]
    fn test_csv_single_song() {
        let csv = to_csv(&single());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines, vec!["title,artist,tempo,energy,path", "A,X,120,5,/a.mp3"]);
    }

    #[test]
    fn test_csv_empty_is_header_only() {
        assert_eq!(to_csv(&[]), "title,artist,tempo,energy,path");
    }

    #[test]
    fn test_csv_quotes_special_fields() {
        let songs = vec![
            Song::new("Hello, Goodbye", "The \"Fab\" Four", 97.5, 6.0, "/music/a b.mp3"),
            Song::new("Two\nLines", " padded", 100.0, 1.0, "/b.mp3"),
        ];
        let csv = to_csv(&songs);
        let records: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(records[1], r#""Hello, Goodbye","The ""Fab"" Four",97.5,6,/music/a b.mp3"#);
        assert_eq!(records[2], "\"Two\nLines\",\" padded\",100,1,/b.mp3");
    }

    #[test]
    fn test_csv_is_deterministic() {
        let songs = vec![
            Song::new("A", "X", 120.0, 5.0, "/a.mp3"),
            Song::new("B", "Y", 90.0, 3.5, "/b.mp3"),
        ];
        assert_eq!(to_csv(&songs), to_csv(&songs));
    }

    #[test]
    fn test_m3u_single_song() {
        assert_eq!(to_m3u(&single()), "/a.mp3");
    }

    #[test]
    fn test_m3u_lines_follow_result_order() {
        let songs = vec![
            Song::new("B", "Y", 90.0, 3.0, "/music/b.flac"),
            Song::new("A", "X", 120.0, 5.0, "/music/a.mp3"),
            Song::new("C", "Z", 140.0, 9.0, "C:\\music\\c.mp3"),
        ];
        let m3u = to_m3u(&songs);
        let lines: Vec<&str> = m3u.split('\n').collect();

        assert_eq!(lines.len(), songs.len());
        for (line, song) in lines.iter().zip(&songs) {
            assert_eq!(*line, song.path);
        }
    }

    #[test]
    fn test_m3u_empty() {
        assert_eq!(to_m3u(&[]), "");
    }

    #[test]
    fn test_export_writes_named_files() {
        let dir = TempDir::new().unwrap();
        let manager = ExportManager::new(dir.path().join("out"));

        let csv_path = manager.export(ExportFormat::Csv, &single()).unwrap();
        let m3u_path = manager.export(ExportFormat::M3u, &single()).unwrap();

        assert_eq!(csv_path, dir.path().join("out").join("playlist.csv"));
        assert_eq!(m3u_path, dir.path().join("out").join("playlist.m3u"));
        assert_eq!(fs::read_to_string(&csv_path).unwrap(), to_csv(&single()));
        assert_eq!(fs::read_to_string(&m3u_path).unwrap(), "/a.mp3");
    }

    #[test]
    fn test_export_overwrites_previous_file() {
        let dir = TempDir::new().unwrap();
        let manager = ExportManager::new(dir.path());

        manager.export(ExportFormat::M3u, &single()).unwrap();
        let path = manager.export(ExportFormat::M3u, &[]).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "");
    }
}
