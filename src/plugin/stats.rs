use crate::plugin::{PluginError, SolverPlugin};
use crate::solver::{Solution, SolverState};

use csv::WriterBuilder;
use decorum::R64;
use num_traits::identities::Zero;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::io::{stderr, Stderr, Write};

pub const PHEROMONE_LEVELS: &str = "pheromone_levels";
pub const TOTAL_PHEROMONE: &str = "total_pheromone";
pub const EDGE_PHEROMONE: &str = "edge_pheromone";
pub const SOLUTIONS: &str = "solutions";
pub const UNIQUE_SOLUTIONS: &str = "unique_solutions";

/// One recorded snapshot value in a metric's series.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    /// Raw per-edge pheromone levels, in edge id order.
    Levels(Vec<R64>),
    Total(R64),
    /// Distribution summary of the edge pheromone levels.
    Spread { min: R64, max: R64, avg: R64 },
    /// Tour-weight summary of one iteration's population. All fields are
    /// unavailable before the first iteration.
    SolutionSummary {
        best: Option<R64>,
        worst: Option<R64>,
        avg: Option<R64>,
        global_best: Option<R64>,
    },
    /// Dedup bookkeeping: total distinct solutions ever seen, distinct
    /// solutions this iteration, and how many of those were new.
    Uniques {
        total: usize,
        iteration: usize,
        new: usize,
    },
}

/// Insertion-ordered mapping from metric name to the series of values
/// recorded for it, one per lifecycle snapshot. Series are append-only.
#[derive(Debug, Default)]
pub struct SeriesMap {
    series: Vec<(String, Vec<StatValue>)>,
}

impl SeriesMap {
    pub fn push(&mut self, name: &str, value: StatValue) {
        match self.series.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value),
            None => self.series.push((name.to_string(), vec![value])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[StatValue]> {
        self.series
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Metric names in first-recorded order.
    pub fn names(&self) -> Vec<String> {
        self.series.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Tabular time series for one metric, ready for a charting backend:
/// one row per recorded snapshot, in recording order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub metric: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Receives finished tables. Implementations draw, persist or forward
/// them; the recorder itself never renders anything.
pub trait ChartBackend {
    fn render(&mut self, table: &Table) -> Result<(), PluginError>;
}

/// Writes every table as one csv block: a title record, a header record
/// and the data rows.
pub struct CsvBackend<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvBackend<W> {
    pub fn from_writer(writer: W) -> Self {
        CsvBackend {
            writer: WriterBuilder::new().flexible(true).from_writer(writer),
        }
    }
}

impl Default for CsvBackend<Stderr> {
    fn default() -> Self {
        CsvBackend::from_writer(stderr())
    }
}

impl<W: Write> ChartBackend for CsvBackend<W> {
    fn render(&mut self, table: &Table) -> Result<(), PluginError> {
        self.writer
            .write_record(&[table.metric.as_str()])
            .map_err(|e| PluginError::Backend(e.to_string()))?;
        self.writer
            .write_record(&table.columns)
            .map_err(|e| PluginError::Backend(e.to_string()))?;
        for row in table.rows.iter() {
            self.writer
                .write_record(row)
                .map_err(|e| PluginError::Backend(e.to_string()))?;
        }
        self.writer
            .flush()
            .map_err(|e| PluginError::Backend(e.to_string()))
    }
}

pub type Extractor = Box<dyn Fn(&SeriesMap, &str) -> Vec<StatValue>>;
pub type Processor = Box<dyn Fn(&str, &[StatValue]) -> Table>;

#[derive(Default)]
struct Pipeline {
    extractor: Option<Extractor>,
    processor: Option<Processor>,
}

/// Records per-iteration statistics snapshots and presents them as tabular
/// time series when the run finishes.
///
/// Presentation is a per-metric pipeline: an extractor pulls the series
/// out of the recorder, a processor shapes it into a [`Table`], and the
/// backend gets the result. Both stages resolve by metric name through an
/// explicit registry and fall back to the defaults (raw series, generic
/// table) when no override is registered, so a newly recorded metric gets
/// a presentation without extra wiring.
pub struct StatRecorder<IndexType, B> {
    stats: SeriesMap,
    seen: HashSet<Solution<IndexType>>,
    pipelines: HashMap<String, Pipeline>,
    backend: B,
}

impl<IndexType, B> StatRecorder<IndexType, B>
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
    B: ChartBackend,
{
    pub fn new(backend: B) -> Self {
        StatRecorder {
            stats: SeriesMap::default(),
            seen: HashSet::new(),
            pipelines: HashMap::new(),
            backend,
        }
    }

    pub fn stats(&self) -> &SeriesMap {
        &self.stats
    }

    /// Number of distinct solutions observed over the whole run so far.
    pub fn distinct_solutions(&self) -> usize {
        self.seen.len()
    }

    pub fn register_extractor<F>(&mut self, name: &str, extractor: F)
    where
        F: Fn(&SeriesMap, &str) -> Vec<StatValue> + 'static,
    {
        self.pipelines
            .entry(name.to_string())
            .or_insert_with(Pipeline::default)
            .extractor = Some(Box::new(extractor));
    }

    pub fn register_processor<F>(&mut self, name: &str, processor: F)
    where
        F: Fn(&str, &[StatValue]) -> Table + 'static,
    {
        self.pipelines
            .entry(name.to_string())
            .or_insert_with(Pipeline::default)
            .processor = Some(Box::new(processor));
    }

    /// Resolves the pipeline for a metric and runs it: extract, process,
    /// return the table. Unknown metrics are an error.
    pub fn table_for(&self, name: &str) -> Result<Table, PluginError> {
        let pipeline = self.pipelines.get(name);
        if self.stats.get(name).is_none() && pipeline.map_or(true, |p| p.extractor.is_none()) {
            return Err(PluginError::UnknownMetric(name.to_string()));
        }

        let values = match pipeline.and_then(|p| p.extractor.as_ref()) {
            Some(extract) => extract(&self.stats, name),
            None => self.stats.get(name).map(|s| s.to_vec()).unwrap_or_default(),
        };
        let table = match pipeline.and_then(|p| p.processor.as_ref()) {
            Some(process) => process(name, &values),
            None => default_table(name, &values),
        };
        Ok(table)
    }

    fn pump_pheromone(&mut self, state: &SolverState<'_, IndexType>) -> Result<(), PluginError> {
        let graph = state.graph.borrow();
        let mut levels = Vec::with_capacity(graph.size());
        for edge in graph.edge_ids() {
            let level = graph
                .pheromone(edge)
                .map_err(|e| PluginError::Graph(e.to_string()))?;
            levels.push(level);
        }
        if levels.is_empty() {
            return Err(PluginError::EmptyGraph);
        }

        let total = levels.iter().fold(R64::zero(), |acc, &l| acc + l);
        let min = levels.iter().copied().min().unwrap_or_else(R64::zero);
        let max = levels.iter().copied().max().unwrap_or_else(R64::zero);
        let avg = total / R64::from_inner(levels.len() as f64);

        self.stats.push(PHEROMONE_LEVELS, StatValue::Levels(levels));
        self.stats.push(TOTAL_PHEROMONE, StatValue::Total(total));
        self.stats
            .push(EDGE_PHEROMONE, StatValue::Spread { min, max, avg });
        Ok(())
    }
}

impl<IndexType, B> SolverPlugin<IndexType> for StatRecorder<IndexType, B>
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
    B: ChartBackend,
{
    fn name(&self) -> &str {
        "stat-recorder"
    }

    fn on_start(&mut self, state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        self.pump_pheromone(state)?;

        self.stats.push(
            SOLUTIONS,
            StatValue::SolutionSummary {
                best: None,
                worst: None,
                avg: None,
                global_best: None,
            },
        );
        self.stats.push(
            UNIQUE_SOLUTIONS,
            StatValue::Uniques {
                total: self.seen.len(),
                iteration: 0,
                new: 0,
            },
        );
        Ok(())
    }

    fn on_iteration(
        &mut self,
        state: &mut SolverState<'_, IndexType>,
        _is_new_best: bool,
    ) -> Result<(), PluginError> {
        self.pump_pheromone(state)?;

        if state.solutions.is_empty() {
            return Err(PluginError::EmptyPopulation);
        }
        let global_best = match state.best {
            Some(best) => best.weight,
            None => return Err(PluginError::NoBestSolution),
        };

        let distances: Vec<R64> = state.solutions.iter().map(|s| s.weight).collect();
        let total = distances.iter().fold(R64::zero(), |acc, &d| acc + d);
        let best = distances.iter().copied().min().unwrap_or_else(R64::zero);
        let worst = distances.iter().copied().max().unwrap_or_else(R64::zero);
        let avg = total / R64::from_inner(distances.len() as f64);

        let round: HashSet<&Solution<IndexType>> = state.solutions.iter().collect();
        let in_iteration = round.len();
        let old_count = self.seen.len();
        for solution in round {
            if !self.seen.contains(solution) {
                self.seen.insert(solution.clone());
            }
        }
        let new = self.seen.len() - old_count;

        self.stats.push(
            SOLUTIONS,
            StatValue::SolutionSummary {
                best: Some(best),
                worst: Some(worst),
                avg: Some(avg),
                global_best: Some(global_best),
            },
        );
        self.stats.push(
            UNIQUE_SOLUTIONS,
            StatValue::Uniques {
                total: self.seen.len(),
                iteration: in_iteration,
                new,
            },
        );
        Ok(())
    }

    fn on_finish(&mut self) -> Result<(), PluginError> {
        for name in self.stats.names() {
            let table = self.table_for(&name)?;
            self.backend.render(&table)?;
        }
        Ok(())
    }
}

/// Shapes a raw series into a table, one row per snapshot, with columns
/// derived from the value variant.
fn default_table(name: &str, values: &[StatValue]) -> Table {
    let columns = match values.first() {
        Some(StatValue::Levels(levels)) => {
            (0..levels.len()).map(|i| format!("edge_{}", i)).collect()
        }
        Some(StatValue::Total(_)) => vec!["total".to_string()],
        Some(StatValue::Spread { .. }) => {
            vec!["min".to_string(), "max".to_string(), "avg".to_string()]
        }
        Some(StatValue::SolutionSummary { .. }) => vec![
            "best".to_string(),
            "worst".to_string(),
            "avg".to_string(),
            "global_best".to_string(),
        ],
        Some(StatValue::Uniques { .. }) => vec![
            "total".to_string(),
            "iteration".to_string(),
            "new".to_string(),
        ],
        None => Vec::new(),
    };

    Table {
        metric: name.to_string(),
        columns,
        rows: values.iter().map(row_of).collect(),
    }
}

fn row_of(value: &StatValue) -> Vec<String> {
    fn cell(value: &Option<R64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    match value {
        StatValue::Levels(levels) => levels.iter().map(|l| l.to_string()).collect(),
        StatValue::Total(total) => vec![total.to_string()],
        StatValue::Spread { min, max, avg } => {
            vec![min.to_string(), max.to_string(), avg.to_string()]
        }
        StatValue::SolutionSummary {
            best,
            worst,
            avg,
            global_best,
        } => vec![cell(best), cell(worst), cell(avg), cell(global_best)],
        StatValue::Uniques {
            total,
            iteration,
            new,
        } => vec![total.to_string(), iteration.to_string(), new.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MatrixGraph;
    use crate::solver::SolverParams;
    use float_cmp::approx_eq;
    use std::cell::RefCell;

    /// Collects rendered tables instead of drawing them.
    #[derive(Default)]
    struct Collecting {
        tables: Vec<Table>,
    }

    impl ChartBackend for Collecting {
        fn render(&mut self, table: &Table) -> Result<(), PluginError> {
            self.tables.push(table.clone());
            Ok(())
        }
    }

    fn test_graph() -> RefCell<MatrixGraph<usize>> {
        let graph = MatrixGraph::new(
            vec![0, 1, 2],
            vec![((0, 1), 1.0), ((1, 2), 1.0), ((0, 2), 2.0)],
        )
        .unwrap();
        RefCell::new(graph)
    }

    fn graph_with_levels(levels: &[f64]) -> RefCell<MatrixGraph<usize>> {
        let graph = test_graph();
        {
            let mut graph = graph.borrow_mut();
            let edges = graph.edge_ids();
            for (edge, level) in edges.into_iter().zip(levels.iter()) {
                graph.set_pheromone(edge, *level).unwrap();
            }
        }
        graph
    }

    fn test_params() -> SolverParams {
        SolverParams::new(1.0, 3.0, 0.03, 1.0, 10, 2, Some(1))
    }

    fn tour(nodes: Vec<usize>, weight: f64) -> Solution<usize> {
        Solution::from_nodes(nodes, R64::from_inner(weight), 1.0, 3.0)
    }

    fn spread_of(recorder: &StatRecorder<usize, Collecting>, index: usize) -> (f64, f64, f64) {
        match recorder.stats().get(EDGE_PHEROMONE).unwrap()[index] {
            StatValue::Spread { min, max, avg } => {
                (min.into_inner(), max.into_inner(), avg.into_inner())
            }
            ref other => panic!("expected spread, got {:?}", other),
        }
    }

    #[test]
    fn on_start_records_the_pheromone_distribution() {
        let graph = graph_with_levels(&[1.0, 2.0, 3.0]);
        let params = test_params();
        let mut population: Vec<Solution<usize>> = Vec::new();
        let mut recorder = StatRecorder::new(Collecting::default());

        let mut state = SolverState {
            graph: &graph,
            solutions: &mut population,
            best: None,
            params: &params,
            iteration: 0,
        };
        recorder.on_start(&mut state).unwrap();

        let (min, max, avg) = spread_of(&recorder, 0);
        assert!(approx_eq!(f64, min, 1.0));
        assert!(approx_eq!(f64, max, 3.0));
        assert!(approx_eq!(f64, avg, 2.0));

        assert_eq!(
            recorder.stats().get(SOLUTIONS).unwrap()[0],
            StatValue::SolutionSummary {
                best: None,
                worst: None,
                avg: None,
                global_best: None,
            }
        );
        assert_eq!(
            recorder.stats().get(UNIQUE_SOLUTIONS).unwrap()[0],
            StatValue::Uniques {
                total: 0,
                iteration: 0,
                new: 0,
            }
        );
    }

    #[test]
    fn on_iteration_records_solution_statistics() {
        let graph = test_graph();
        let params = test_params();
        let best = tour(vec![0, 1, 2, 0], 4.0);
        let mut population = vec![tour(vec![0, 1, 2, 0], 4.0), tour(vec![0, 2, 1, 0], 4.0)];
        let mut recorder = StatRecorder::new(Collecting::default());

        let mut state = SolverState {
            graph: &graph,
            solutions: &mut population,
            best: Some(&best),
            params: &params,
            iteration: 0,
        };
        recorder.on_iteration(&mut state, true).unwrap();

        match recorder.stats().get(SOLUTIONS).unwrap()[0] {
            StatValue::SolutionSummary {
                best: Some(b),
                worst: Some(w),
                avg: Some(a),
                global_best: Some(g),
            } => {
                assert!(approx_eq!(f64, b.into_inner(), 4.0));
                assert!(approx_eq!(f64, w.into_inner(), 4.0));
                assert!(approx_eq!(f64, a.into_inner(), 4.0));
                assert!(approx_eq!(f64, g.into_inner(), 4.0));
            }
            ref other => panic!("expected full summary, got {:?}", other),
        }
    }

    #[test]
    fn seen_solutions_grow_monotonically_and_new_matches_the_growth() {
        let graph = test_graph();
        let params = test_params();
        let best = tour(vec![0, 1, 2, 0], 4.0);
        let mut recorder = StatRecorder::new(Collecting::default());

        // first iteration: two distinct tours, one of them duplicated
        let mut population = vec![
            tour(vec![0, 1, 2, 0], 4.0),
            tour(vec![0, 1, 2, 0], 4.0),
            tour(vec![0, 2, 1, 0], 4.0),
        ];
        let mut state = SolverState {
            graph: &graph,
            solutions: &mut population,
            best: Some(&best),
            params: &params,
            iteration: 0,
        };
        recorder.on_iteration(&mut state, true).unwrap();

        assert_eq!(
            recorder.stats().get(UNIQUE_SOLUTIONS).unwrap()[0],
            StatValue::Uniques {
                total: 2,
                iteration: 2,
                new: 2,
            }
        );

        // second iteration: one known tour, one new
        let mut population = vec![tour(vec![0, 1, 2, 0], 4.0), tour(vec![1, 0, 2, 1], 4.0)];
        let mut state = SolverState {
            graph: &graph,
            solutions: &mut population,
            best: Some(&best),
            params: &params,
            iteration: 1,
        };
        recorder.on_iteration(&mut state, false).unwrap();

        assert_eq!(
            recorder.stats().get(UNIQUE_SOLUTIONS).unwrap()[1],
            StatValue::Uniques {
                total: 3,
                iteration: 2,
                new: 1,
            }
        );
        assert_eq!(recorder.distinct_solutions(), 3);
    }

    #[test]
    fn empty_population_errors() {
        let graph = test_graph();
        let params = test_params();
        let mut population: Vec<Solution<usize>> = Vec::new();
        let mut recorder = StatRecorder::new(Collecting::default());

        let mut state = SolverState {
            graph: &graph,
            solutions: &mut population,
            best: None,
            params: &params,
            iteration: 0,
        };

        assert_eq!(
            recorder.on_iteration(&mut state, false),
            Err(PluginError::EmptyPopulation)
        );
    }

    #[test]
    fn default_pipeline_produces_one_row_per_snapshot() {
        let graph = test_graph();
        let params = test_params();
        let best = tour(vec![0, 1, 2, 0], 4.0);
        let mut recorder = StatRecorder::new(Collecting::default());

        {
            let mut population: Vec<Solution<usize>> = Vec::new();
            let mut state = SolverState {
                graph: &graph,
                solutions: &mut population,
                best: None,
                params: &params,
                iteration: 0,
            };
            recorder.on_start(&mut state).unwrap();
        }
        for i in 0..2 {
            let mut population = vec![tour(vec![0, 1, 2, 0], 4.0)];
            let mut state = SolverState {
                graph: &graph,
                solutions: &mut population,
                best: Some(&best),
                params: &params,
                iteration: i,
            };
            recorder.on_iteration(&mut state, false).unwrap();
        }

        let table = recorder.table_for(EDGE_PHEROMONE).unwrap();
        assert_eq!(table.columns, vec!["min", "max", "avg"]);
        assert_eq!(table.rows.len(), 3);

        let table = recorder.table_for(UNIQUE_SOLUTIONS).unwrap();
        assert_eq!(table.columns, vec!["total", "iteration", "new"]);
        assert_eq!(table.rows[1], vec!["1", "1", "1"]);
    }

    #[test]
    fn unknown_metric_errors() {
        let recorder: StatRecorder<usize, Collecting> = StatRecorder::new(Collecting::default());

        assert_eq!(
            recorder.table_for("no_such_metric"),
            Err(PluginError::UnknownMetric("no_such_metric".to_string()))
        );
    }

    #[test]
    fn registered_overrides_take_precedence_by_name() {
        let graph = graph_with_levels(&[1.0, 2.0, 3.0]);
        let params = test_params();
        let mut recorder = StatRecorder::new(Collecting::default());

        // extractor keeping only the last snapshot, processor renaming columns
        recorder.register_extractor(EDGE_PHEROMONE, |stats, name| {
            stats
                .get(name)
                .and_then(|series| series.last())
                .cloned()
                .into_iter()
                .collect()
        });
        recorder.register_processor(EDGE_PHEROMONE, |name, values| Table {
            metric: format!("{}_summary", name),
            columns: vec!["low".to_string(), "high".to_string()],
            rows: values
                .iter()
                .map(|value| match value {
                    StatValue::Spread { min, max, .. } => {
                        vec![min.to_string(), max.to_string()]
                    }
                    _ => Vec::new(),
                })
                .collect(),
        });

        {
            let mut population: Vec<Solution<usize>> = Vec::new();
            let mut state = SolverState {
                graph: &graph,
                solutions: &mut population,
                best: None,
                params: &params,
                iteration: 0,
            };
            recorder.on_start(&mut state).unwrap();
        }

        let table = recorder.table_for(EDGE_PHEROMONE).unwrap();
        assert_eq!(table.metric, "edge_pheromone_summary");
        assert_eq!(table.rows, vec![vec!["1".to_string(), "3".to_string()]]);

        // other metrics keep the default pipeline
        let table = recorder.table_for(PHEROMONE_LEVELS).unwrap();
        assert_eq!(table.columns, vec!["edge_0", "edge_1", "edge_2"]);
    }

    #[test]
    fn on_finish_renders_every_metric_in_recording_order() {
        let graph = test_graph();
        let params = test_params();
        let best = tour(vec![0, 1, 2, 0], 4.0);
        let mut recorder = StatRecorder::new(Collecting::default());

        {
            let mut population: Vec<Solution<usize>> = Vec::new();
            let mut state = SolverState {
                graph: &graph,
                solutions: &mut population,
                best: None,
                params: &params,
                iteration: 0,
            };
            recorder.on_start(&mut state).unwrap();
        }
        {
            let mut population = vec![tour(vec![0, 1, 2, 0], 4.0)];
            let mut state = SolverState {
                graph: &graph,
                solutions: &mut population,
                best: Some(&best),
                params: &params,
                iteration: 0,
            };
            recorder.on_iteration(&mut state, true).unwrap();
        }
        recorder.on_finish().unwrap();

        let rendered: Vec<&str> = recorder
            .backend
            .tables
            .iter()
            .map(|t| t.metric.as_str())
            .collect();
        assert_eq!(
            rendered,
            vec![
                PHEROMONE_LEVELS,
                TOTAL_PHEROMONE,
                EDGE_PHEROMONE,
                SOLUTIONS,
                UNIQUE_SOLUTIONS,
            ]
        );
    }

    #[test]
    fn csv_backend_writes_title_header_and_rows() {
        let mut backend = CsvBackend::from_writer(Vec::new());
        backend
            .render(&Table {
                metric: "edge_pheromone".to_string(),
                columns: vec!["min".to_string(), "max".to_string(), "avg".to_string()],
                rows: vec![vec!["1".to_string(), "3".to_string(), "2".to_string()]],
            })
            .unwrap();

        let written = String::from_utf8(backend.writer.into_inner().unwrap()).unwrap();
        assert_eq!(written, "edge_pheromone\nmin,max,avg\n1,3,2\n");
    }
}
