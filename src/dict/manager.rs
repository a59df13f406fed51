use crate::checker::dictionary::{parse_word_list, Dictionary};
use crate::checker::hunspell::hunspell_words;
use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

// LibreOffice hunspell lists; override with `--url` to pin a revision.
const HUNSPELL_BASE_URL: &str = "https://raw.githubusercontent.com/LibreOffice/dictionaries/master";

/// Affix and word list URLs of a supported language, as `(aff, dic)`.
pub fn hunspell_urls(language: &str) -> Result<(String, String)> {
    match language {
        "ru_RU" => Ok((
            format!("{}/ru_RU/ru_RU.aff", HUNSPELL_BASE_URL),
            format!("{}/ru_RU/ru_RU.dic", HUNSPELL_BASE_URL),
        )),
        other => anyhow::bail!(
            "Language '{}' is not supported. Only 'ru_RU' is currently available.",
            other
        ),
    }
}

/// The `.aff` that goes with a `.dic` URL, if the URL names one.
pub fn affix_url(dic_url: &str) -> Option<String> {
    dic_url
        .strip_suffix(".dic")
        .map(|base| format!("{}.aff", base))
}

fn data_dir() -> Result<PathBuf> {
    let data_dir = Config::data_dir().context("Failed to get data directory")?;
    fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
    Ok(data_dir)
}

/// A compiled dictionary found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDictionary {
    pub language: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Compiled `.dict` files in `dir`, sorted by language.
pub fn installed_dictionaries(dir: &Path) -> Result<Vec<InstalledDictionary>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("dict") {
            continue;
        }
        let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        found.push(InstalledDictionary {
            language: language.to_string(),
            size: fs::metadata(&path)?.len(),
            path,
        });
    }

    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = Config::data_dir().context("Failed to get data directory")?;
    let installed = installed_dictionaries(&data_dir)?;

    if installed.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!("Try {}", "pravka dict download ru_RU".cyan());
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    for dict in &installed {
        println!(
            "  {} {:<8} {}",
            "•".green(),
            dict.language.cyan().bold(),
            format!("{} KB", dict.size / 1024).dimmed()
        );
    }
    println!("In {}", data_dir.display().to_string().dimmed());

    Ok(())
}

/// Compile a word list into `output`, returning the number of words.
pub fn build_dictionary(content: &str, output: &Path) -> Result<usize> {
    let words = parse_word_list(content);
    if words.is_empty() {
        anyhow::bail!("Word list is empty");
    }
    Dictionary::build_from_words(&words, output)
}

/// Compile a hunspell pair into `output` with every affixed form listed.
pub fn build_hunspell_dictionary(aff: &[u8], dic: &[u8], output: &Path) -> Result<usize> {
    let words = hunspell_words(aff, dic)?;
    if words.is_empty() {
        anyhow::bail!("Word list is empty");
    }
    Dictionary::build_from_words(&words, output)
}

/// Compile a word list (expanded with `aff` when given) into the data
/// directory as `<language>.dict`.
fn install(content: &[u8], aff: Option<&[u8]>, language: &str) -> Result<(PathBuf, usize)> {
    let dict_path = data_dir()?.join(format!("{}.dict", language));
    let count = match aff {
        Some(aff) => build_hunspell_dictionary(aff, content, &dict_path)?,
        None => build_dictionary(&String::from_utf8_lossy(content), &dict_path)?,
    };
    Ok((dict_path, count))
}

fn report_installed(dict_path: &Path, count: usize) {
    println!(
        "{} Built {} with {} words",
        "✓".green().bold(),
        dict_path.display().to_string().cyan(),
        count.to_string().yellow()
    );
}

pub fn build_from_file(wordlist: &Path, language: &str, affix: Option<&Path>) -> Result<PathBuf> {
    let bytes = fs::read(wordlist)
        .with_context(|| format!("Failed to read word list: {}", wordlist.display()))?;

    let sibling = wordlist.with_extension("aff");
    let affix = match affix {
        Some(path) => Some(path),
        None if wordlist.extension().and_then(|e| e.to_str()) == Some("dic")
            && sibling.is_file() =>
        {
            Some(sibling.as_path())
        }
        None => None,
    };
    let aff = affix
        .map(|path| {
            log::debug!("Expanding affixes from {}", path.display());
            fs::read(path).with_context(|| format!("Failed to read affixes: {}", path.display()))
        })
        .transpose()?;

    let (dict_path, count) = install(&bytes, aff.as_deref(), language)?;
    report_installed(&dict_path, count);
    Ok(dict_path)
}

fn fetch(url: &str) -> Result<Vec<u8>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    spinner.set_message(format!("Fetching {}", url));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes());
    spinner.finish_and_clear();

    let bytes = result.with_context(|| format!("Failed to download {}", url))?;
    log::debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

pub fn download_dictionary(language: &str, url: Option<&str>) -> Result<PathBuf> {
    let (aff_url, dic_url) = match url {
        Some(url) => (affix_url(url), url.to_string()),
        None => {
            let (aff, dic) = hunspell_urls(language)?;
            (Some(aff), dic)
        }
    };

    println!("{} {} dictionary", "Downloading".cyan().bold(), language.yellow());
    let aff = aff_url.as_deref().map(fetch).transpose()?;
    let dic = fetch(&dic_url)?;

    let (dict_path, count) = install(&dic, aff.as_deref(), language)?;
    report_installed(&dict_path, count);
    Ok(dict_path)
}

pub fn show_info(language: &str) -> Result<()> {
    let data_dir = Config::data_dir().context("Failed to get data directory")?;
    let Some(dict) = installed_dictionaries(&data_dir)?
        .into_iter()
        .find(|d| d.language == language)
    else {
        println!("{} No {} dictionary installed", "✗".red().bold(), language.yellow());
        println!("Try {}", format!("pravka dict download {}", language).cyan());
        return Ok(());
    };

    println!("{} {}", language.bold(), dict.path.display().to_string().dimmed());
    println!("  size:  {} KB", dict.size / 1024);
    match Dictionary::load_from_path(&dict.path) {
        Ok(loaded) => println!("  words: {}", loaded.len().to_string().yellow()),
        Err(e) => println!("  {}: {:#}", "unreadable".red(), e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_dictionary_from_hunspell() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("ru_RU.dict");

        let count = build_dictionary("2\nкот/AB\nдом/C\n", &output).unwrap();
        assert_eq!(count, 2);

        let dict = Dictionary::load_from_path(&output).unwrap();
        assert!(dict.contains("кот"));
    }

    #[test]
    fn test_empty_word_list_is_rejected() {
        let dir = tempdir().unwrap();
        assert!(build_dictionary("0\n", &dir.path().join("x.dict")).is_err());
    }

    #[test]
    fn test_installed_dictionaries() {
        let dir = tempdir().unwrap();
        build_dictionary("да\nнет\n", &dir.path().join("ru_RU.dict")).unwrap();
        build_dictionary("yes\nno\n", &dir.path().join("en_US.dict")).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let installed = installed_dictionaries(dir.path()).unwrap();
        let languages: Vec<_> = installed.iter().map(|d| d.language.as_str()).collect();
        assert_eq!(languages, vec!["en_US", "ru_RU"]);

        assert!(installed_dictionaries(&dir.path().join("missing"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_build_expands_affixes() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("ru_RU.dict");
        let aff = "SET UTF-8\nSFX A Y 2\nSFX A ть ли ть\nSFX A ть л ть\n";

        let count =
            build_hunspell_dictionary(aff.as_bytes(), "1\nзапустить/A\n".as_bytes(), &output)
                .unwrap();
        assert_eq!(count, 3);

        let dict = Dictionary::load_from_path(&output).unwrap();
        assert!(dict.contains("запустили"));
        assert!(dict.contains("запустил"));
    }

    #[test]
    fn test_hunspell_urls() {
        let (aff, dic) = hunspell_urls("ru_RU").unwrap();
        assert!(aff.ends_with("ru_RU/ru_RU.aff"));
        assert!(dic.ends_with("ru_RU/ru_RU.dic"));
        assert!(hunspell_urls("xx_XX").is_err());

        assert_eq!(
            affix_url("https://example.org/ru.dic").as_deref(),
            Some("https://example.org/ru.aff")
        );
        assert_eq!(affix_url("https://example.org/words.txt"), None);
    }
}
