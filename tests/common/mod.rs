// Shared helpers for integration tests
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::Mutex;

use sumtopic::models::{Summarizer, TopicClassifier};
use sumtopic::types::{LengthBudget, TopicPrediction};

const VOCAB: [&str; 8] = ["the", "cat", "sat", "on", "a", "warm", "red", "mat"];

/// `n` short words separated by single spaces.
pub fn words(n: usize) -> String {
    (0..n).map(|i| VOCAB[i % VOCAB.len()]).collect::<Vec<_>>().join(" ")
}

/// Summarizer double that records every call.
pub struct FakeSummarizer {
    pub reply: Result<String, String>,
    pub calls: Mutex<Vec<(String, LengthBudget)>>,
}

impl FakeSummarizer {
    pub fn replying(summary: &str) -> Self {
        Self { reply: Ok(summary.to_string()), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(error: &str) -> Self {
        Self { reply: Err(error.to_string()), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<(String, LengthBudget)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Summarizer for FakeSummarizer {
    fn summarize(&self, text: &str, budget: LengthBudget) -> Result<String> {
        self.calls.lock().unwrap().push((text.to_string(), budget));
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

/// Classifier double that records every input it sees.
pub struct FakeClassifier {
    pub reply: Result<TopicPrediction, String>,
    pub inputs: Mutex<Vec<String>>,
}

impl FakeClassifier {
    pub fn replying(label: &str, score: f32) -> Self {
        Self { reply: Ok(TopicPrediction::new(label, score)), inputs: Mutex::new(Vec::new()) }
    }

    pub fn failing(error: &str) -> Self {
        Self { reply: Err(error.to_string()), inputs: Mutex::new(Vec::new()) }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl TopicClassifier for FakeClassifier {
    fn classify(&self, text: &str) -> Result<TopicPrediction> {
        self.inputs.lock().unwrap().push(text.to_string());
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

/// A small PDF with one Courier text line per page. Empty strings give blank pages.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
        ];
        if !text.is_empty() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
