//! Per-city staffing and productivity aggregation.

use crate::city::City;
use crate::constants;
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Employee roles. Production from each role feeds a different part of the
/// pipeline: Operations/Engineer drive production, Business drives sales,
/// Management multiplies the others, R&D accrues research points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Job {
    /// Operations
    Operations,
    /// Engineer
    Engineer,
    /// Business
    Business,
    /// Management
    Management,
    /// Research & Development
    ResearchDev,
}

impl Job {
    /// Every job, in stable order.
    pub const ALL: [Job; 5] = [
        Job::Operations,
        Job::Engineer,
        Job::Business,
        Job::Management,
        Job::ResearchDev,
    ];
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Job::Operations => "Operations",
            Job::Engineer => "Engineer",
            Job::Business => "Business",
            Job::Management => "Management",
            Job::ResearchDev => "Research & Development",
        };
        f.write_str(name)
    }
}

/// Per-role production output, used both as an office's current production
/// snapshot and as a product's accumulated development contributions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFactors {
    /// Operations output.
    pub operations: f64,
    /// Engineer output.
    pub engineer: f64,
    /// Business output.
    pub business: f64,
    /// Management output.
    pub management: f64,
    /// R&D output.
    pub research: f64,
}

impl JobFactors {
    /// Sum over all roles.
    pub fn total(&self) -> f64 {
        self.operations + self.engineer + self.business + self.management + self.research
    }
}

/// Employee-stat multipliers granted by research.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmployeeMultipliers {
    /// Intelligence multiplier.
    pub intelligence: f64,
    /// Charisma multiplier.
    pub charisma: f64,
    /// Creativity multiplier.
    pub creativity: f64,
    /// Efficiency multiplier.
    pub efficiency: f64,
}

impl Default for EmployeeMultipliers {
    fn default() -> Self {
        EmployeeMultipliers {
            intelligence: 1.0,
            charisma: 1.0,
            creativity: 1.0,
            efficiency: 1.0,
        }
    }
}

/// A division's office in one city: headcount by role plus aggregate
/// employee statistics. Individual employees are not modeled; the office
/// carries averages the way the simulation's balance formulas consume them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfficeSpace {
    /// City this office is in.
    pub city: City,
    /// Employee capacity.
    pub size: u32,
    /// Headcount per role.
    pub jobs: BTreeMap<Job, u32>,
    /// Average morale in [0, 100].
    pub avg_morale: f64,
    /// Average energy in [0, 100].
    pub avg_energy: f64,
    /// Average intelligence.
    pub avg_intelligence: f64,
    /// Average charisma.
    pub avg_charisma: f64,
    /// Average creativity.
    pub avg_creativity: f64,
    /// Average efficiency.
    pub avg_efficiency: f64,
    /// Average accumulated experience; grows slowly over cycles.
    pub avg_experience: f64,
    /// Salary paid out during the last START phase, absolute.
    pub total_salary: f64,
    /// Per-role production, recomputed every START phase. Derived; not
    /// persisted.
    #[serde(skip)]
    pub production_by_job: JobFactors,
}

impl OfficeSpace {
    /// Empty office at baseline employee statistics.
    pub fn new(city: City, size: u32) -> Self {
        OfficeSpace {
            city,
            size,
            jobs: BTreeMap::new(),
            avg_morale: 100.0,
            avg_energy: 100.0,
            avg_intelligence: 75.0,
            avg_charisma: 75.0,
            avg_creativity: 75.0,
            avg_efficiency: 75.0,
            avg_experience: 0.0,
            total_salary: 0.0,
            production_by_job: JobFactors::default(),
        }
    }

    /// Total employees across roles.
    pub fn num_employees(&self) -> u32 {
        self.jobs.values().sum()
    }

    /// Headcount in one role.
    pub fn count(&self, job: Job) -> u32 {
        self.jobs.get(&job).copied().unwrap_or(0)
    }

    /// Assign `count` employees to `job`, replacing the previous headcount.
    pub fn assign(&mut self, job: Job, count: u32) -> Result<(), ValidationError> {
        let others: u32 = self
            .jobs
            .iter()
            .filter(|(j, _)| **j != job)
            .map(|(_, c)| *c)
            .sum();
        let requested = others + count;
        if requested > self.size {
            return Err(ValidationError::OfficeCapacityExceeded {
                size: self.size,
                requested,
            });
        }
        self.jobs.insert(job, count);
        Ok(())
    }

    /// Advance one batch of cycles: decay morale/energy, accrue experience,
    /// recompute per-role production, and return the salary paid.
    pub fn process(&mut self, market_cycles: f64, mults: &EmployeeMultipliers) -> f64 {
        let decay = constants::MORALE_DECAY_PER_CYCLE * market_cycles;
        self.avg_morale = (self.avg_morale - decay).max(constants::MIN_EMPLOYEE_MORALE);
        self.avg_energy = (self.avg_energy - decay).max(constants::MIN_EMPLOYEE_MORALE);
        self.avg_experience += 0.0015 * market_cycles * self.num_employees().min(1) as f64;

        self.recompute_production(mults);

        let headcount = self.num_employees() as f64;
        let seniority = 1.0 + self.avg_experience / 1000.0;
        self.total_salary = headcount
            * constants::EMPLOYEE_SALARY_RATE
            * seniority
            * constants::SECONDS_PER_MARKET_CYCLE
            * market_cycles;
        self.total_salary
    }

    /// Recompute [`OfficeSpace::production_by_job`] from headcounts and
    /// aggregate stats. Each role weights the stats differently.
    pub fn recompute_production(&mut self, mults: &EmployeeMultipliers) {
        let int = self.avg_intelligence * mults.intelligence;
        let cha = self.avg_charisma * mults.charisma;
        let cre = self.avg_creativity * mults.creativity;
        let eff = self.avg_efficiency * mults.efficiency;
        let exp = self.avg_experience;
        let base = self.avg_morale * self.avg_energy * 1e-4;

        let weight = |job: Job| -> f64 {
            match job {
                Job::Operations => 0.6 * int + 0.1 * cha + exp + 0.5 * cre + eff,
                Job::Engineer => int + 0.1 * cha + 1.5 * exp + eff,
                Job::Business => 0.4 * int + cha + 0.5 * exp,
                Job::Management => 2.0 * cha + exp + 0.2 * cre + 0.7 * eff,
                Job::ResearchDev => 1.5 * int + 0.8 * exp + cre + 0.5 * eff,
            }
        };

        let prod = |office: &OfficeSpace, job: Job| -> f64 {
            office.count(job) as f64 * base * weight(job)
        };
        self.production_by_job = JobFactors {
            operations: prod(self, Job::Operations),
            engineer: prod(self, Job::Engineer),
            business: prod(self, Job::Business),
            management: prod(self, Job::Management),
            research: prod(self, Job::ResearchDev),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::City;

    fn staffed_office() -> OfficeSpace {
        let mut office = OfficeSpace::new(City::Sector12, 9);
        office.assign(Job::Operations, 3).unwrap();
        office.assign(Job::Engineer, 2).unwrap();
        office.assign(Job::Business, 1).unwrap();
        office.assign(Job::Management, 2).unwrap();
        office.assign(Job::ResearchDev, 1).unwrap();
        office
    }

    #[test]
    fn assign_respects_capacity() {
        let mut office = OfficeSpace::new(City::Aevum, 3);
        office.assign(Job::Operations, 2).unwrap();
        office.assign(Job::Engineer, 1).unwrap();
        let err = office.assign(Job::Business, 1).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OfficeCapacityExceeded {
                size: 3,
                requested: 4
            }
        );
        // Reassignment of an existing role is not additive.
        office.assign(Job::Operations, 1).unwrap();
        office.assign(Job::Business, 1).unwrap();
        assert_eq!(office.num_employees(), 3);
    }

    #[test]
    fn process_pays_salary_and_produces() {
        let mut office = staffed_office();
        let salary = office.process(1.0, &EmployeeMultipliers::default());
        assert!(salary > 0.0);
        assert_eq!(salary, office.total_salary);
        assert!(office.production_by_job.operations > 0.0);
        assert!(office.production_by_job.research > 0.0);
        // No business-free roles leak into each other.
        let empty = OfficeSpace::new(City::Aevum, 3);
        assert_eq!(empty.production_by_job.total(), 0.0);
    }

    #[test]
    fn morale_decays_to_floor_not_below() {
        let mut office = staffed_office();
        office.process(1e6, &EmployeeMultipliers::default());
        assert_eq!(office.avg_morale, constants::MIN_EMPLOYEE_MORALE);
        assert_eq!(office.avg_energy, constants::MIN_EMPLOYEE_MORALE);
    }

    #[test]
    fn salary_scales_with_batch_length() {
        let mut a = staffed_office();
        let mut b = staffed_office();
        let s1 = a.process(1.0, &EmployeeMultipliers::default());
        let s10 = b.process(10.0, &EmployeeMultipliers::default());
        // Experience drift makes the comparison approximate.
        assert!((s10 / s1 - 10.0).abs() < 0.1);
    }

    #[test]
    fn serde_skips_derived_production() {
        let mut office = staffed_office();
        office.process(1.0, &EmployeeMultipliers::default());
        let s = serde_json::to_string(&office).unwrap();
        let back: OfficeSpace = serde_json::from_str(&s).unwrap();
        assert_eq!(back.production_by_job, JobFactors::default());
        assert_eq!(back.jobs, office.jobs);
    }
}
