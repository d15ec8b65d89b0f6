//! In-memory document index for the local-simulation fallback tier
//!
//! Documents are loaded once at startup and never mutated, so the index is
//! safe for unsynchronized concurrent reads. Ranking uses a deliberately
//! simple keyword-overlap heuristic; this is a fallback for when the real
//! retrieval backend is unreachable, not a search engine.

mod static_kb;

pub use static_kb::{StaticAnswer, StaticKnowledge, Topic};

use crate::types::Language;
use serde::{Deserialize, Serialize};

/// Official site, used as the citation URL for locally-ranked documents
pub const SITE_URL: &str = "https://eniad.ump.ma/fr";

/// A knowledge document held in memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub language: Language,
    pub category: String,
    /// Relevance reported when the document is served without query scoring
    /// (canned search-simulation results)
    pub static_hint: f32,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        language: Language,
        category: impl Into<String>,
        static_hint: f32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            language,
            category: category.into(),
            static_hint: static_hint.clamp(0.0, 1.0),
        }
    }
}

/// A document together with its score for one query
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Immutable, startup-loaded document list
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    documents: Vec<Document>,
}

impl DocumentIndex {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rank all documents against a query, descending by score. The sort is
    /// stable: equal scores keep insertion order, so results are reproducible.
    pub fn search(&self, query: &str) -> Vec<ScoredDocument> {
        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .map(|doc| ScoredDocument {
                score: relevance(query, doc),
                document: doc.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    /// Seed set covering the topics the assistant is asked about most:
    /// admissions, programs, news, research and events, in French and Arabic.
    pub fn seeded() -> Self {
        Self::new(vec![
            Document::new(
                "admission-fr",
                "Les conditions d'admission",
                "Les conditions d'admission à l'ENIAD sont le baccalauréat scientifique ou \
                 technique, suivi d'un concours écrit et d'un entretien. La période de \
                 candidature s'étend de mars à juin.",
                Language::Fr,
                "administrative",
                0.9,
            ),
            Document::new(
                "programmes-fr",
                "Programmes de formation ENIAD",
                "L'ENIAD propose un cycle ingénieur en intelligence artificielle couvrant le \
                 machine learning, le deep learning, le traitement du langage naturel, la \
                 vision par ordinateur et l'éthique de l'IA.",
                Language::Fr,
                "academic",
                0.9,
            ),
            Document::new(
                "formation-ia-fr",
                "Nouvelle formation en Intelligence Artificielle à ENIAD",
                "ENIAD lance une nouvelle formation spécialisée en intelligence artificielle \
                 appliquée à l'éducation. Cette formation de deux ans prépare les étudiants \
                 aux métiers émergents de l'IA dans le secteur éducatif.",
                Language::Fr,
                "news",
                0.8,
            ),
            Document::new(
                "recherche-fr",
                "Projets de recherche en IA - ENIAD",
                "Les équipes de recherche d'ENIAD travaillent sur des assistants pédagogiques \
                 intelligents, l'analyse automatique de performances d'apprentissage et la \
                 création de contenus éducatifs adaptatifs.",
                Language::Fr,
                "research",
                0.7,
            ),
            Document::new(
                "conference-fr",
                "Conférence Internationale IA et Éducation",
                "ENIAD organise sa conférence annuelle sur l'intelligence artificielle et \
                 l'éducation, rassemblant des experts internationaux autour des avancées de \
                 l'IA éducative.",
                Language::Fr,
                "events",
                0.7,
            ),
            Document::new(
                "admission-ar",
                "شروط القبول في المدرسة",
                "شروط القبول في المدرسة الوطنية للذكاء الاصطناعي والرقمي هي بكالوريا علمية \
                 أو تقنية، يليها اختبار كتابي ومقابلة. فترة الترشيح من مارس إلى يونيو.",
                Language::Ar,
                "administrative",
                0.9,
            ),
            Document::new(
                "programmes-ar",
                "برامج التكوين في الذكاء الاصطناعي",
                "تقدم المدرسة دورة المهندس في الذكاء الاصطناعي تشمل التعلم الآلي والشبكات \
                 العصبية ومعالجة اللغة الطبيعية والرؤية الحاسوبية وأخلاقيات الذكاء الاصطناعي.",
                Language::Ar,
                "academic",
                0.9,
            ),
            Document::new(
                "news-ar",
                "أخبار وفعاليات المدرسة",
                "تنشر المدرسة آخر الأخبار والفعاليات والإعلانات على موقعها الرسمي، بما في \
                 ذلك الشراكات ومشاريع البحث الجديدة.",
                Language::Ar,
                "news",
                0.7,
            ),
        ])
    }
}

/// Keyword-overlap relevance of a document for a query, in [0, 1].
///
/// Tokens are lowercase and whitespace-delimited. Each query token adds 0.3
/// when it substring-matches a title token and 0.2 when it substring-matches
/// a content token (either string containing the other counts). A 0.2 bonus
/// applies when the query mentions the document category, 0.1 when the
/// document language matches the detected query language. The sum is
/// normalized by query token count and clamped to 1.0. An empty query always
/// scores 0.
pub fn relevance(query: &str, doc: &Document) -> f32 {
    let query_lower = query.to_lowercase();
    let query_tokens: Vec<&str> = query_lower.split_whitespace().collect();
    if query_tokens.is_empty() {
        return 0.0;
    }

    let title_lower = doc.title.to_lowercase();
    let title_tokens: Vec<&str> = title_lower.split_whitespace().collect();
    let content_lower = doc.content.to_lowercase();
    let content_tokens: Vec<&str> = content_lower.split_whitespace().collect();

    let mut raw = 0.0f32;
    for qt in &query_tokens {
        if title_tokens.iter().any(|t| tokens_overlap(t, qt)) {
            raw += 0.3;
        }
        if content_tokens.iter().any(|t| tokens_overlap(t, qt)) {
            raw += 0.2;
        }
    }

    if query_lower.contains(&doc.category.to_lowercase()) {
        raw += 0.2;
    }
    if doc.language == Language::detect(query) {
        raw += 0.1;
    }

    (raw / query_tokens.len() as f32).min(1.0)
}

fn tokens_overlap(field_token: &str, query_token: &str) -> bool {
    field_token.contains(query_token) || query_token.contains(field_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RELEVANCE_THRESHOLD;
    use proptest::prelude::*;

    fn doc(title: &str, content: &str, lang: Language, category: &str) -> Document {
        Document::new("t", title, content, lang, category, 0.5)
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let d = doc("Les conditions d'admission", "contenu", Language::Fr, "administrative");
        assert_eq!(relevance("", &d), 0.0);
        assert_eq!(relevance("   ", &d), 0.0);
    }

    #[test]
    fn test_admission_query_reaches_threshold() {
        let index = DocumentIndex::seeded();
        let hits = index.search("Quelles sont les conditions d'admission?");
        let top = &hits[0];
        assert_eq!(top.document.category, "administrative");
        assert_eq!(top.document.language, Language::Fr);
        assert!(
            top.score >= RELEVANCE_THRESHOLD,
            "top score {} below threshold",
            top.score
        );
    }

    #[test]
    fn test_search_is_deterministic_and_stable() {
        let index = DocumentIndex::seeded();
        let a = index.search("formation intelligence artificielle");
        let b = index.search("formation intelligence artificielle");
        let ids_a: Vec<&str> = a.iter().map(|h| h.document.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);

        // Equal scores keep insertion order
        let tied = DocumentIndex::new(vec![
            doc("alpha", "x", Language::Fr, "general"),
            doc("beta", "x", Language::Fr, "general"),
        ]);
        let hits = tied.search("zzz");
        assert_eq!(hits[0].document.title, "alpha");
        assert_eq!(hits[1].document.title, "beta");
    }

    #[test]
    fn test_category_and_language_bonuses() {
        let d = doc("titre", "contenu", Language::Fr, "administrative");
        // One-token query naming the category: 0.2 category + 0.1 language
        let with_cat = relevance("administrative", &d);
        let without = relevance("autre", &d);
        assert!(with_cat > without);
    }

    #[test]
    fn test_arabic_language_bonus() {
        let fr = doc("titre", "contenu", Language::Fr, "academic");
        let ar = doc("titre", "contenu", Language::Ar, "academic");
        let q = "برامج";
        assert!(relevance(q, &ar) > relevance(q, &fr));
    }

    proptest! {
        #[test]
        fn prop_relevance_bounded(query in ".{0,80}", title in ".{0,40}", content in ".{0,200}") {
            let d = doc(&title, &content, Language::Fr, "general");
            let score = relevance(&query, &d);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
