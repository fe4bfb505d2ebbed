use super::{delete_by_id, entity_key, reorder, sort_by_order, Listed, Visibility};
use crate::common::error::Result;
use crate::domain::Skill;
use crate::storage::{Repository, Storage};
use crate::validation::{
    CertificationInput, EducationInput, EntityInput, ExperienceInput, Mode, ReorderInput, SkillInput,
};
use chrono::Utc;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::marker::PhantomData;
use std::sync::Arc;

/// CRUD over one ordered, hideable about-page collection.
pub struct Collection<I: EntityInput> {
    repo: Repository<I::Entity>,
    _input: PhantomData<fn() -> I>,
}

pub type SkillService = Collection<SkillInput>;
pub type ExperienceService = Collection<ExperienceInput>;
pub type EducationService = Collection<EducationInput>;
pub type CertificationService = Collection<CertificationInput>;

impl<I: EntityInput> Clone for Collection<I> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            _input: PhantomData,
        }
    }
}

impl<I> Collection<I>
where
    I: EntityInput,
    I::Entity: Listed,
{
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            repo: Repository::new(storage),
            _input: PhantomData,
        }
    }

    pub async fn list(&self, visibility: Visibility) -> Result<Vec<I::Entity>> {
        let mut items = self.repo.filter(|item| visibility.matches(item.visible())).await?;
        sort_by_order(&mut items);
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> Result<I::Entity> {
        self.repo.get(&entity_key::<I::Entity>(id)?).await
    }

    pub async fn create(&self, input: I) -> Result<I::Entity> {
        input.validate(Mode::Create)?;
        let item = input.build(Utc::now());
        self.repo.save(&item).await?;
        Ok(item)
    }

    pub async fn update(&self, id: &str, input: I) -> Result<I::Entity> {
        let mut item = self.get(id).await?;
        input.validate(Mode::Update)?;
        input.apply(&mut item, Utc::now());
        self.repo.save(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        delete_by_id(&self.repo, id).await
    }

    pub async fn reorder(&self, input: &ReorderInput) -> Result<usize> {
        reorder(&self.repo, input).await
    }
}

/// Skills keyed by category, categories in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillGroups(pub Vec<(String, Vec<Skill>)>);

impl SkillGroups {
    pub fn from_skills(skills: Vec<Skill>) -> Self {
        let mut groups: Vec<(String, Vec<Skill>)> = Vec::new();
        for skill in skills {
            match groups.iter_mut().find(|(category, _)| *category == skill.category) {
                Some((_, members)) => members.push(skill),
                None => groups.push((skill.category.clone(), vec![skill])),
            }
        }
        SkillGroups(groups)
    }
}

impl Serialize for SkillGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, skills) in &self.0 {
            map.serialize_entry(category, skills)?;
        }
        map.end()
    }
}
