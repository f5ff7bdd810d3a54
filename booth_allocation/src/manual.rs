/*!

This is the long-form manual for `booth_allocation` and `boothalloc`.

## How voters are allocated

An allocation run takes the whole nominal roll and the list of booths and
places every voter in exactly one booth:

1. Voters are grouped by department. The department is compared after trimming
   and upper-casing, so `Physics` and ` PHYSICS` are the same group.
2. The largest department is split into classes: one group per
   `DEPARTMENT YEAR STREAM`, for example `CS 1 UG`. The other departments stay whole,
   which keeps the students of a department together in the printed rosters.
3. The groups are sorted from the largest to the smallest. Each group in turn goes to
   the booth that has the fewest voters so far. When several booths have the same
   load, the first one in the list wins.

Every run starts from empty booths: the loads of a previous run are not reused.
Running the allocation twice on the same data gives the same result.

The allocator does not rebalance after packing and booths have no declared capacity.

### Example

Three booths, and a roll with `CS` (50 voters: `CS 1 UG` 20, `CS 2 UG` 20, `CS 3 UG` 10),
`HISTORY` (15) and `BOTANY` (10):

| step | group     | size | booth   | loads after   |
|------|-----------|------|---------|---------------|
| 1    | CS 1 UG   | 20   | Booth 1 | 20 / 0 / 0    |
| 2    | CS 2 UG   | 20   | Booth 2 | 20 / 20 / 0   |
| 3    | HISTORY   | 15   | Booth 3 | 20 / 20 / 15  |
| 4    | CS 3 UG   | 10   | Booth 3 | 20 / 20 / 25  |
| 5    | BOTANY    | 10   | Booth 1 | 30 / 20 / 25  |

## Rules

- `splitTieBreak` (`alphabetical` or `firstEncountered`, default `alphabetical`): which
  department is split when several share the largest size.
- `missingDepartment` (`leaveUnassigned` or `catchAllGroup`, default `leaveUnassigned`):
  voters with an empty department are either left out of the run (their previous booth
  is cleared and they are listed under `unassigned` in the summary) or allocated together
  in a group called `UNASSIGNED`. With `catchAllGroup`, a department actually named
  `Unassigned` is refused, since the two groups could not be told apart.
- `splitLargest` (boolean, default `true`): set to `false` to keep every department whole.
- `chunkSize` (number, default 500): the maximum number of documents written at once.

## Writing the result

The plan is persisted through a [`BulkWriter`](crate::BulkWriter): booth counts first,
then the voters. The writes are committed in chunks, one after the other. If a chunk
fails, the run stops and reports the chunk index. The chunks written before it are
not rolled back: fix the problem and run the allocation again.

## Nominal roll formats

`boothalloc import` accepts:
* `csv` a CSV file with a header row
* `xlsx` an Excel workbook, header in the first row
* `json` an array of voter documents, as stored by `boothalloc`

Column names are matched loosely: `Adm No`, `Admission Number` and `Roll No` all
point to the admission number, `Dept`, `Department`, `Course` and `Branch` to the
department, and so on. Rows without an admission number get an id built from the file
name and the line number.

```text
Sl No,Name,Gender,Dept,Year,Stream,Admission Number
1,Sample,Male,Botany,1,UG,12345
```

 */
