use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::classify::{AgeGrouper, TopicClassifier};
use crate::error::{ParentAiError, Result};
use crate::knowledge::{Guidance, KnowledgeBase, LookupChain};
use crate::llm::{Generated, KnowledgeContext, PromptAssembler, PromptContext, ResponseGenerator};
use crate::models::{
    AgeBand, Answer, AnswerSource, ConversationRecord, Question, ScoredChunk, Topic,
};
use crate::retrieval::PassageRetriever;
use crate::session::SessionStore;

/// Answers caregiver questions end to end.
///
/// Classification and knowledge lookup never fail; the completion service
/// is the only remote dependency on the default path, and its failures are
/// turned into an apology rather than an error. Cancellation is the one
/// failure returned to the caller.
pub struct ParentingAssistant {
    grouper: AgeGrouper,
    classifier: TopicClassifier,
    knowledge: Arc<KnowledgeBase>,
    retriever: Option<Arc<PassageRetriever>>,
    generator: ResponseGenerator,
    assembler: PromptAssembler,
    sessions: Arc<dyn SessionStore>,
    prompt_chain: LookupChain,
    fallback_chain: LookupChain,
}

impl ParentingAssistant {
    pub fn new(
        grouper: AgeGrouper,
        classifier: TopicClassifier,
        knowledge: Arc<KnowledgeBase>,
        generator: ResponseGenerator,
        assembler: PromptAssembler,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            grouper,
            classifier,
            knowledge,
            retriever: None,
            generator,
            assembler,
            sessions,
            prompt_chain: LookupChain::for_prompt(),
            fallback_chain: LookupChain::for_fallback(),
        }
    }

    /// Grounds answers in passages from the reference document first.
    pub fn with_retriever(mut self, retriever: Arc<PassageRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn grouper(&self) -> &AgeGrouper {
        &self.grouper
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn retriever(&self) -> Option<&Arc<PassageRetriever>> {
        self.retriever.as_ref()
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Short canned replies for a topic, resolved for the child's age.
    pub fn quick_replies(&self, topic: Topic, age_months: Option<u32>) -> Vec<String> {
        let band = self.grouper.band(age_months);
        self.knowledge.quick_responses(topic, band)
    }

    pub async fn answer(&self, question: &Question, cancel: &CancellationToken) -> Result<Answer> {
        let text = question.text.trim();
        if text.is_empty() {
            return Err(ParentAiError::Validation(
                "Question cannot be empty".to_string(),
            ));
        }

        let band = self.grouper.band(question.age_months);
        let topic = self.classifier.classify(text);
        tracing::info!(%topic, age_band = %band, "Answering question");

        if let Some(passages) = self.retrieve(text).await {
            if passages.is_empty() {
                tracing::debug!(%topic, "No passage cleared the similarity floor");
                return Ok(self.knowledge_fallback(text, topic, band));
            }

            let prompt = self.assembler.assemble(&PromptContext {
                topic,
                band,
                caller_context: question.context_or_empty(),
                question: text,
                knowledge: KnowledgeContext::Passages(&passages),
            });
            tracing::debug!(chunks = passages.len(), "Prompt grounded on retrieved passages");
            return self.generate(&prompt, text, topic, band, cancel).await;
        }

        match self.prompt_chain.resolve(&self.knowledge, topic, band) {
            Some(Guidance::Record {
                topic: record_topic,
                band: record_band,
                record,
            }) => {
                let prompt = self.assembler.assemble(&PromptContext {
                    topic,
                    band,
                    caller_context: question.context_or_empty(),
                    question: text,
                    knowledge: KnowledgeContext::Record {
                        topic: record_topic,
                        band: record_band,
                        record,
                    },
                });
                self.generate(&prompt, text, topic, band, cancel).await
            }
            _ => Ok(self.knowledge_fallback(text, topic, band)),
        }
    }

    /// Answers on behalf of a known caller: the stored child age and context
    /// fill whatever the question leaves out, and the exchange is recorded.
    pub async fn answer_with_session(
        &self,
        user_id: &str,
        mut question: Question,
        cancel: &CancellationToken,
    ) -> Result<Answer> {
        let profile = self.sessions.ensure_profile(user_id).await?;
        if question.age_months.is_none() {
            question.age_months = profile.child_age_months;
        }
        if question.context.is_none() && !profile.context.is_empty() {
            question.context = Some(profile.context.clone());
        }

        let answer = self.answer(&question, cancel).await?;

        self.sessions
            .record_exchange(
                user_id,
                ConversationRecord {
                    question: question.text.trim().to_string(),
                    answer: answer.text.clone(),
                    topic: answer.topic,
                    timestamp: Utc::now(),
                    age_months: question.age_months,
                },
            )
            .await?;

        Ok(answer)
    }

    pub async fn answer_for(&self, user_id: &str, text: &str) -> Result<Answer> {
        self.answer_with_session(user_id, Question::new(text), &CancellationToken::new())
            .await
    }

    /// `None` when retrieval is not configured, has no corpus or failed.
    async fn retrieve(&self, text: &str) -> Option<Vec<ScoredChunk>> {
        let retriever = self.retriever.as_ref()?;
        if retriever.corpus().await.is_empty() {
            return None;
        }

        match retriever.retrieve(text).await {
            Ok(passages) => Some(passages),
            Err(error) => {
                tracing::warn!(error = %error, "Passage retrieval failed, using knowledge table");
                None
            }
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        question: &str,
        topic: Topic,
        band: AgeBand,
        cancel: &CancellationToken,
    ) -> Result<Answer> {
        let generated = self.generator.generate(prompt, question, band, cancel).await?;
        let source = match generated {
            Generated::Completion(_) => AnswerSource::Generated,
            Generated::Fallback(_) => AnswerSource::ErrorFallback,
        };

        Ok(Answer {
            text: generated.into_text(),
            topic,
            age_band: band,
            source,
        })
    }

    fn knowledge_fallback(&self, question: &str, topic: Topic, band: AgeBand) -> Answer {
        let generic = Guidance::Generic(self.knowledge.generic_text());
        let guidance = self
            .fallback_chain
            .resolve(&self.knowledge, topic, band)
            .unwrap_or(generic);

        Answer {
            text: self.assembler.fallback_response(question, band, &guidance),
            topic,
            age_band: band,
            source: AnswerSource::KnowledgeFallback,
        }
    }
}
