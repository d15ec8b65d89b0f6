//! Static knowledge base, the terminal fallback tier
//!
//! A fixed record about the school, templated into short answers by topic.
//! Topic detection is plain keyword matching on the query text in the query's
//! language. No keyword match means the tier fails and the resolver reports
//! exhaustion.

use crate::types::{Language, Source};

/// Topics the static knowledge base can answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Programs,
    Admissions,
    News,
    General,
}

/// A templated answer built from the static record
#[derive(Debug, Clone)]
pub struct StaticAnswer {
    pub topic: Topic,
    pub answer: String,
    pub sources: Vec<Source>,
}

struct KnowledgeRecord {
    name: &'static str,
    location: &'static str,
    speciality: &'static str,
    programs: &'static [&'static str],
    admission_period: &'static str,
    admission_requirements: &'static str,
    admission_process: &'static str,
    website: &'static str,
    news_url: &'static str,
}

const RECORD_FR: KnowledgeRecord = KnowledgeRecord {
    name: "ENIAD (École Nationale de l'Intelligence Artificielle et du Digital)",
    location: "Berkane, Maroc",
    speciality: "Intelligence artificielle et technologies digitales",
    programs: &[
        "Cycle Ingénieur en Intelligence Artificielle",
        "Machine Learning et Deep Learning",
        "Traitement du Langage Naturel",
        "Vision par Ordinateur",
        "Éthique de l'IA",
    ],
    admission_period: "Mars à Juin",
    admission_requirements: "Baccalauréat scientifique ou technique",
    admission_process: "Concours écrit + entretien",
    website: "https://eniad.ump.ma/fr",
    news_url: "https://eniad.ump.ma/fr/actualite",
};

const RECORD_AR: KnowledgeRecord = KnowledgeRecord {
    name: "ENIAD (المدرسة الوطنية للذكاء الاصطناعي والرقمي)",
    location: "بركان، المغرب",
    speciality: "الذكاء الاصطناعي والتكنولوجيا الرقمية",
    programs: &[
        "دورة المهندس في الذكاء الاصطناعي",
        "التعلم الآلي والشبكات العصبية",
        "معالجة اللغة الطبيعية",
        "الرؤية الحاسوبية",
        "أخلاقيات الذكاء الاصطناعي",
    ],
    admission_period: "من مارس إلى يونيو",
    admission_requirements: "بكالوريا علمية أو تقنية",
    admission_process: "اختبار كتابي + مقابلة",
    website: "https://eniad.ump.ma/fr",
    news_url: "https://eniad.ump.ma/fr/actualite",
};

const PROGRAM_KEYWORDS_FR: &[&str] = &["programme", "formation", "cours", "filière", "étude"];
const ADMISSION_KEYWORDS_FR: &[&str] = &["admission", "inscription", "candidature", "concours"];
const NEWS_KEYWORDS_FR: &[&str] = &["actualité", "actualités", "news", "événement", "evenement"];
const GENERAL_KEYWORDS_FR: &[&str] = &["eniad", "école", "ecole", "berkane", "information"];

const PROGRAM_KEYWORDS_AR: &[&str] = &["برنامج", "برامج", "تكوين", "دراسة", "تخصص"];
const ADMISSION_KEYWORDS_AR: &[&str] = &["تسجيل", "قبول", "ترشيح", "مباراة"];
const NEWS_KEYWORDS_AR: &[&str] = &["أخبار", "خبر", "فعالية", "حدث", "مستجدات"];
const GENERAL_KEYWORDS_AR: &[&str] = &["المدرسة", "مدرسة", "معلومات", "بركان"];

/// The static knowledge lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticKnowledge;

impl StaticKnowledge {
    pub fn new() -> Self {
        Self
    }

    /// Detect the query topic, if any keyword matches
    pub fn match_topic(&self, query: &str, language: Language) -> Option<Topic> {
        let query = query.to_lowercase();
        let (programs, admissions, news, general) = match language {
            Language::Ar => (
                PROGRAM_KEYWORDS_AR,
                ADMISSION_KEYWORDS_AR,
                NEWS_KEYWORDS_AR,
                GENERAL_KEYWORDS_AR,
            ),
            _ => (
                PROGRAM_KEYWORDS_FR,
                ADMISSION_KEYWORDS_FR,
                NEWS_KEYWORDS_FR,
                GENERAL_KEYWORDS_FR,
            ),
        };

        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| query.contains(k));

        if contains_any(programs) {
            Some(Topic::Programs)
        } else if contains_any(admissions) {
            Some(Topic::Admissions)
        } else if contains_any(news) {
            Some(Topic::News)
        } else if contains_any(general) {
            Some(Topic::General)
        } else {
            None
        }
    }

    /// Build a templated answer for the query, or `None` when no topic
    /// keyword matches.
    pub fn answer(&self, query: &str, language: Language) -> Option<StaticAnswer> {
        let topic = self.match_topic(query, language)?;
        let record = match language {
            Language::Ar => &RECORD_AR,
            _ => &RECORD_FR,
        };

        let program_list = record
            .programs
            .iter()
            .map(|p| format!("• {p}"))
            .collect::<Vec<_>>()
            .join("\n");

        let answer = match (topic, language) {
            (Topic::Programs, Language::Ar) => format!(
                "برامج {} :\n\n{}\n\nالموقع: {}\nالموقع الإلكتروني: {}",
                record.name, program_list, record.location, record.website
            ),
            (Topic::Programs, _) => format!(
                "Programmes {} :\n\n{}\n\nLocalisation : {}\nSite web : {}",
                record.name, program_list, record.location, record.website
            ),
            (Topic::Admissions, Language::Ar) => format!(
                "التسجيل في {} :\n\n• فترة التسجيل: {}\n• المتطلبات: {}\n• عملية الاختيار: {}\n\nللمزيد من المعلومات: {}",
                record.name,
                record.admission_period,
                record.admission_requirements,
                record.admission_process,
                record.website
            ),
            (Topic::Admissions, _) => format!(
                "Inscription à {} :\n\n• Période d'inscription : {}\n• Prérequis : {}\n• Processus de sélection : {}\n\nPlus d'informations : {}",
                record.name,
                record.admission_period,
                record.admission_requirements,
                record.admission_process,
                record.website
            ),
            (Topic::News, Language::Ar) => format!(
                "أخبار وفعاليات {} :\n\n• الأخبار الحديثة: {}\n• الموقع الرسمي: {}",
                record.name, record.news_url, record.website
            ),
            (Topic::News, _) => format!(
                "Actualités et événements {} :\n\n• Dernières actualités : {}\n• Site officiel : {}",
                record.name, record.news_url, record.website
            ),
            (Topic::General, Language::Ar) => format!(
                "مرحباً بك في مساعد {} !\n\n• الاسم: {}\n• الموقع: {}\n• التخصص: {}\n\nالموقع الرسمي: {}",
                record.name, record.name, record.location, record.speciality, record.website
            ),
            (Topic::General, _) => format!(
                "Bienvenue sur l'assistant {} !\n\n• Nom : {}\n• Localisation : {}\n• Spécialité : {}\n\nSite officiel : {}",
                record.name, record.name, record.location, record.speciality, record.website
            ),
        };

        let mut sources = vec![Source::new(record.name, record.website, 1.0)];
        if topic == Topic::News {
            sources.push(Source::new("Actualités ENIAD", record.news_url, 1.0));
        }

        Some(StaticAnswer {
            topic,
            answer,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_matching_french() {
        let kb = StaticKnowledge::new();
        assert_eq!(
            kb.match_topic("Quelles formations proposez-vous?", Language::Fr),
            Some(Topic::Programs)
        );
        assert_eq!(
            kb.match_topic("conditions d'admission", Language::Fr),
            Some(Topic::Admissions)
        );
        assert_eq!(
            kb.match_topic("dernières actualités", Language::Fr),
            Some(Topic::News)
        );
        assert_eq!(
            kb.match_topic("parlez-moi de l'ENIAD", Language::Fr),
            Some(Topic::General)
        );
        assert_eq!(kb.match_topic("météo demain", Language::Fr), None);
    }

    #[test]
    fn test_arabic_programs_answer_lists_programs() {
        let kb = StaticKnowledge::new();
        let answer = kb
            .answer("برامج الذكاء الاصطناعي", Language::Ar)
            .expect("keyword should match");
        assert_eq!(answer.topic, Topic::Programs);
        for program in RECORD_AR.programs {
            assert!(answer.answer.contains(program), "missing program {program}");
        }
        assert!(!answer.sources.is_empty());
    }

    #[test]
    fn test_no_keyword_means_no_answer() {
        let kb = StaticKnowledge::new();
        assert!(kb.answer("quantum entanglement", Language::Fr).is_none());
    }

    #[test]
    fn test_news_answer_cites_news_url() {
        let kb = StaticKnowledge::new();
        let answer = kb.answer("les actualités du campus", Language::Fr).unwrap();
        assert_eq!(answer.sources.len(), 2);
        assert!(answer.sources[1].url.contains("actualite"));
    }
}
