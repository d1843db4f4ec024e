//! The `quizdeck init` command.

use std::path::Path;

use anyhow::Result;

const SAMPLE_FOLDER: &str = "data/grade3_sem1_mid_korean";

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizdeck.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all(SAMPLE_FOLDER)?;
    write_if_missing(&Path::new(SAMPLE_FOLDER).join("index.json"), SAMPLE_INDEX)?;
    write_if_missing(&Path::new(SAMPLE_FOLDER).join("set1.json"), SAMPLE_SET)?;

    println!("\nNext steps:");
    println!("  1. Edit quizdeck.toml to point at your question store");
    println!("  2. Run: quizdeck validate --path data");
    println!("  3. Run: quizdeck sets");
    println!("  4. Run: quizdeck take --set 중간1");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdeck configuration

request_timeout_secs = 30
shuffle = true
# shuffle_seed = 42
output_dir = "./quizdeck-results"

[default_filter]
grade = "grade3"
semester = "sem1"
examType = "mid"
subject = "korean"

[store]
type = "files"
root = "./data"

# [store]
# type = "http"
# base_url = "https://quiz.example.com/api"
# api_key = "${QUIZDECK_API_KEY}"
"#;

const SAMPLE_INDEX: &str = r#"[
  { "name": "중간1", "file": "set1.json" }
]
"#;

const SAMPLE_SET: &str = r#"{
  "title": "중간1",
  "list": [
    {
      "passageTitle": "소나기",
      "passage": "소년은 개울가에서 소녀를 보자 곧 윤 초시네 증손녀딸이라는 걸 알 수 있었다.",
      "question": "이 글의 배경이 되는 장소는?",
      "choices": ["학교", "개울가", "시장", "산꼭대기"],
      "answer": 1,
      "explanation": "소년이 소녀를 처음 본 곳은 개울가입니다.",
      "type": "objective",
      "image": ""
    },
    {
      "passageTitle": "",
      "passage": "",
      "question": "다음 중 명사는?",
      "choices": ["하늘", "달리다", "예쁘다", "빨리"],
      "answer": 0,
      "explanation": "'하늘'은 사물의 이름을 나타내는 명사입니다.",
      "type": "objective",
      "image": ""
    },
    {
      "passageTitle": "",
      "passage": "",
      "question": "'봄'과 반대되는 계절은?",
      "choices": ["여름", "겨울", "가을", "장마"],
      "answer": 2,
      "explanation": "사계절에서 봄의 반대편은 가을입니다.",
      "type": "objective",
      "image": ""
    }
  ]
}
"#;
