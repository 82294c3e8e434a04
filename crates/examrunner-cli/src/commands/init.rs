//! The `examrunner init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create examrunner.toml
    if std::path::Path::new("examrunner.toml").exists() {
        println!("examrunner.toml already exists, skipping.");
    } else {
        std::fs::write("examrunner.toml", SAMPLE_CONFIG)?;
        println!("Created examrunner.toml");
    }

    // Create example question bank
    std::fs::create_dir_all("public")?;
    let bank_path = std::path::Path::new("public/questions.json");
    if bank_path.exists() {
        println!("public/questions.json already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_QUESTIONS)?;
        println!("Created public/questions.json");
    }

    println!("\nNext steps:");
    println!("  1. Replace public/questions.json with your own questions");
    println!("  2. Run: examrunner validate --questions public/questions.json");
    println!("  3. Run: examrunner take");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examrunner configuration

output_dir = "./exam-results"
confirm_quit = true
# expected_count = 200

[source]
type = "file"
path = "public/questions.json"

# Or fetch the questions over HTTP:
# [source]
# type = "http"
# url = "${EXAMRUNNER_BANK_URL}"
# timeout_secs = 10
"#;

pub(crate) const SAMPLE_QUESTIONS: &str = r#"[
  {
    "id": 1,
    "question": "Which layer of the OSI model is responsible for routing?",
    "options": ["Data link", "Network", "Transport", "Session"],
    "answerIndex": 1
  },
  {
    "id": 2,
    "question": "Which data structure works on a last-in, first-out basis?",
    "options": ["Queue", "Heap", "Stack", "Linked list"],
    "answerIndex": 2
  },
  {
    "id": 3,
    "question": "What is the binary representation of decimal 10?",
    "options": ["1010", "1001", "1100", "0110"],
    "answerIndex": 0
  },
  {
    "id": 4,
    "question": "Which SQL statement removes all rows but keeps the table?",
    "options": ["DROP", "DELETE FROM ... WHERE 1 = 0", "ALTER", "TRUNCATE"],
    "answerIndex": 3
  },
  {
    "id": 5,
    "question": "Which protocol resolves an IP address to a MAC address?",
    "options": ["DNS", "ARP", "DHCP", "ICMP"],
    "answerIndex": 1
  }
]
"#;
